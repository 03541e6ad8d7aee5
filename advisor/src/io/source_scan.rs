//! Source files sampled by the quality gate.

use std::fs;
use std::path::Path;

use tracing::debug;
use walkdir::{DirEntry, WalkDir};

const SOURCE_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx"];
const SKIPPED_DIRS: &[&str] = &["node_modules", ".git", "target"];

fn is_skipped(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && SKIPPED_DIRS
            .iter()
            .any(|name| entry.file_name().to_str() == Some(*name))
}

fn is_source(entry: &DirEntry) -> bool {
    entry.file_type().is_file()
        && entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
}

/// First `limit` source files under `root` in path order, as
/// `(root-relative path, contents)`. Unreadable files are skipped.
pub fn sample_sources(root: &Path, limit: usize) -> Vec<(String, String)> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_skipped(entry))
        .filter_map(Result::ok)
        .filter(is_source)
        .filter_map(|entry| {
            let path = entry.path();
            let relative = path.strip_prefix(root).unwrap_or(path);
            let relative = relative.to_string_lossy().replace('\\', "/");
            match fs::read_to_string(path) {
                Ok(contents) => Some((relative, contents)),
                Err(err) => {
                    debug!(path = %path.display(), err = %err, "skipping unreadable source");
                    None
                }
            }
        })
        .take(limit)
        .collect()
}
