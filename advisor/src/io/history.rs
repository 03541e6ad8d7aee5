//! Bounded, append-only JSON history files.
//!
//! A history file is a single object `{"<key>": [entry, ...]}`. Appending
//! keeps only the newest `cap` entries and replaces the file atomically.

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::CheckError;

/// Append `entry` under `key`, keeping the last `cap` entries.
///
/// A missing or unreadable history starts fresh rather than failing.
pub fn append_bounded(path: &Path, key: &str, entry: Value, cap: usize) -> Result<usize, CheckError> {
    let mut entries = read_entries(path, key);
    entries.push(entry);
    if entries.len() > cap {
        let excess = entries.len() - cap;
        entries.drain(..excess);
    }
    let kept = entries.len();

    let mut doc = Map::new();
    doc.insert(key.to_string(), Value::Array(entries));
    let mut buf = serde_json::to_string_pretty(&Value::Object(doc))
        .map_err(|err| CheckError::parse("history", err))?;
    buf.push('\n');
    write_atomic(path, &buf)?;
    debug!(path = %path.display(), kept, "history appended");
    Ok(kept)
}

/// Best-effort append. Failures are logged and dropped.
pub fn record(path: &Path, key: &str, entry: Value, cap: usize) {
    if let Err(err) = append_bounded(path, key, entry, cap) {
        warn!(path = %path.display(), err = %err, "failed to write history");
    }
}

fn read_entries(path: &Path, key: &str) -> Vec<Value> {
    let Ok(contents) = fs::read_to_string(path) else {
        return Vec::new();
    };
    match serde_json::from_str::<Value>(&contents) {
        Ok(Value::Object(mut doc)) => match doc.remove(key) {
            Some(Value::Array(entries)) => entries,
            _ => Vec::new(),
        },
        Ok(_) | Err(_) => {
            debug!(path = %path.display(), "malformed history, starting fresh");
            Vec::new()
        }
    }
}

fn write_atomic(path: &Path, contents: &str) -> Result<(), CheckError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| CheckError::io("create directory", parent, &err))?;
    }
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, contents).map_err(|err| CheckError::io("write", &tmp_path, &err))?;
    fs::rename(&tmp_path, path).map_err(|err| CheckError::io("replace", path, &err))
}
