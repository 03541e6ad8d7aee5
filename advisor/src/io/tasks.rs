//! Task list loading.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::core::types::TaskList;
use crate::error::CheckError;

/// Load `tasks.json`. A missing file is [`CheckError::MissingInput`].
pub fn load_task_list(path: &Path) -> Result<TaskList, CheckError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(CheckError::MissingInput {
                path: path.to_path_buf(),
            });
        }
        Err(err) => return Err(CheckError::io("read", path, &err)),
    };
    serde_json::from_str(&contents)
        .map_err(|err| CheckError::parse(path.display().to_string(), err))
}
