//! Markdown plan document parsing.
//!
//! Plans are free-form; the only structure relied on is heading strings,
//! numbered step lines (`1. ...`) and file-like tokens.

use std::sync::LazyLock;

use regex::Regex;

pub const REQUIRED_SECTIONS: [&str; 3] = ["## Context", "## Steps", "## Acceptance Criteria"];
pub const PROGRESS_HEADING: &str = "## Progress Tracking";

const COMPLETION_MARKERS: [&str; 4] = ["✓", "✅", "[COMPLETED]", "(DONE)"];

static STEP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+\.\s").expect("step regex"));
static BACKTICK_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`]*\.[a-zA-Z]{2,4})`").expect("backtick file regex"));
static BARE_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-zA-Z0-9_/-]+\.[a-zA-Z]{2,4})").expect("bare file regex"));
static PROGRESS_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^## Progress Tracking").expect("progress heading regex"));
static LEVEL_TWO_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^## ").expect("heading regex"));

/// Lines that open a numbered step.
pub fn step_lines(plan: &str) -> Vec<&str> {
    plan.lines().filter(|line| STEP.is_match(line)).collect()
}

/// Step lines carrying a completion marker. A line counts once.
pub fn completed_step_count(plan: &str) -> usize {
    step_lines(plan)
        .into_iter()
        .filter(|line| COMPLETION_MARKERS.iter().any(|marker| line.contains(marker)))
        .count()
}

pub fn word_count(plan: &str) -> usize {
    plan.split_whitespace().count()
}

pub fn missing_sections(plan: &str) -> Vec<&'static str> {
    REQUIRED_SECTIONS
        .iter()
        .copied()
        .filter(|section| !plan.contains(section))
        .collect()
}

/// File paths mentioned in the plan, backticked ones first, deduplicated.
pub fn file_mentions(plan: &str) -> Vec<String> {
    let mut mentions: Vec<String> = Vec::new();
    let candidates = BACKTICK_FILE
        .captures_iter(plan)
        .chain(BARE_FILE.captures_iter(plan))
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()));
    for mention in candidates {
        if mention.starts_with("http")
            || mention.starts_with("www.")
            || !mention.contains('.')
            || mention.len() <= 2
        {
            continue;
        }
        if !mentions.iter().any(|seen| seen == mention) {
            mentions.push(mention.to_string());
        }
    }
    mentions
}

/// Insert `section` as the plan's progress section, replacing any existing one.
///
/// The existing section spans from its heading to the next level-2 heading
/// (or end of document), so its `###` subsections are replaced with it.
pub fn upsert_progress_section(plan: &str, section: &str) -> String {
    let section = section.trim_end();
    let Some(start) = PROGRESS_START.find(plan).map(|m| m.start()) else {
        return format!("{}\n\n{}\n", plan.trim_end(), section);
    };
    let body_from = start + PROGRESS_HEADING.len();
    match LEVEL_TWO_HEADING.find_at(plan, body_from) {
        Some(next) => format!("{}{}\n\n{}", &plan[..start], section, &plan[next.start()..]),
        None => format!("{}{}\n", &plan[..start], section),
    }
}
