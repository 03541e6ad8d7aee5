//! Case-insensitive keyword matching shared by the scorers.

use std::sync::LazyLock;

use regex::Regex;

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b[a-zA-Z]+\b").expect("word regex"));

const STOP_WORDS: &[&str] = &[
    "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "a", "an",
];

/// True if `text` contains any of `keywords`, ignoring case.
pub fn contains_any(text: &str, keywords: &[&str]) -> bool {
    let text = text.to_lowercase();
    keywords
        .iter()
        .any(|keyword| text.contains(&keyword.to_lowercase()))
}

/// Number of distinct `keywords` that occur in `text`, ignoring case.
pub fn count_present(text: &str, keywords: &[&str]) -> usize {
    let text = text.to_lowercase();
    keywords
        .iter()
        .filter(|keyword| text.contains(&keyword.to_lowercase()))
        .count()
}

/// Final `/`-separated component of a repository-relative path.
pub fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Up to five significant words (longer than three letters, not stop words).
pub fn significant_words(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    WORD.find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|word| word.len() > 3 && !STOP_WORDS.contains(word))
        .take(5)
        .map(str::to_string)
        .collect()
}
