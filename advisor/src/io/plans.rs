//! Plan documents under the tasks directory.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tracing::debug;

use crate::error::CheckError;

const PLAN_PREFIX: &str = "plan-";
const PLAN_SUFFIX: &str = ".md";

/// Where the plan for `task_id` lives: `plan-<lowercased id>.md`.
pub fn plan_path(tasks_dir: &Path, task_id: &str) -> PathBuf {
    tasks_dir.join(format!("{PLAN_PREFIX}{}{PLAN_SUFFIX}", task_id.to_lowercase()))
}

/// Plan files in `tasks_dir`, sorted by name. A missing directory has none.
pub fn list_plans(tasks_dir: &Path) -> Result<Vec<PathBuf>, CheckError> {
    let entries = match fs::read_dir(tasks_dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(CheckError::io("list", tasks_dir, &err)),
    };
    let mut plans = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| CheckError::io("list", tasks_dir, &err))?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with(PLAN_PREFIX) && name.ends_with(PLAN_SUFFIX) && entry.path().is_file() {
            plans.push(entry.path());
        }
    }
    plans.sort();
    Ok(plans)
}

fn modified_at(path: &Path) -> Result<SystemTime, CheckError> {
    fs::metadata(path)
        .and_then(|meta| meta.modified())
        .map_err(|err| CheckError::io("stat", path, &err))
}

/// Most recently modified plan, if any.
pub fn latest_plan(tasks_dir: &Path) -> Result<Option<PathBuf>, CheckError> {
    let mut latest: Option<(SystemTime, PathBuf)> = None;
    for path in list_plans(tasks_dir)? {
        let modified = modified_at(&path)?;
        if latest.as_ref().is_none_or(|(best, _)| modified > *best) {
            latest = Some((modified, path));
        }
    }
    Ok(latest.map(|(_, path)| path))
}

/// True when `path` was modified within `window` of `now`. An mtime in the
/// future counts as recent.
pub fn modified_within(path: &Path, window: Duration, now: SystemTime) -> Result<bool, CheckError> {
    let modified = modified_at(path)?;
    let recent = match now.duration_since(modified) {
        Ok(age) => age <= window,
        Err(_) => true,
    };
    debug!(path = %path.display(), recent, "plan recency");
    Ok(recent)
}

/// Most recently modified plan, if it was touched within `window`.
pub fn recent_plan(
    tasks_dir: &Path,
    window: Duration,
    now: SystemTime,
) -> Result<Option<PathBuf>, CheckError> {
    match latest_plan(tasks_dir)? {
        Some(path) if modified_within(&path, window, now)? => Ok(Some(path)),
        _ => Ok(None),
    }
}

pub fn read_plan(path: &Path) -> Result<String, CheckError> {
    fs::read_to_string(path).map_err(|err| match err.kind() {
        ErrorKind::NotFound => CheckError::MissingInput {
            path: path.to_path_buf(),
        },
        _ => CheckError::io("read", path, &err),
    })
}

/// Replace the plan atomically (temp file + rename).
pub fn write_plan(path: &Path, contents: &str) -> Result<(), CheckError> {
    let tmp_path = path.with_extension("md.tmp");
    fs::write(&tmp_path, contents).map_err(|err| CheckError::io("write", &tmp_path, &err))?;
    fs::rename(&tmp_path, path).map_err(|err| CheckError::io("replace", path, &err))
}
