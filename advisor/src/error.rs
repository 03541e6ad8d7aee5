//! Typed failures surfaced by signal collectors.
//!
//! Checks never let these escape to the caller: a failed signal degrades to
//! an empty one via [`OrEmpty`], and anything left over is folded into a
//! `continue` decision by [`crate::checks::run_check`].

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckError {
    #[error("missing input {}", path.display())]
    MissingInput { path: PathBuf },

    #[error("{program} not found")]
    ToolNotFound { program: String },

    #[error("{program} timed out after {}s", timeout.as_secs())]
    Timeout { program: String, timeout: Duration },

    #[error("{program} failed: {detail}")]
    Tool { program: String, detail: String },

    #[error("parse {what}: {detail}")]
    Parse { what: String, detail: String },

    #[error("{op} {}: {detail}", path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        detail: String,
    },
}

impl CheckError {
    pub fn io(op: &'static str, path: impl Into<PathBuf>, err: &std::io::Error) -> Self {
        CheckError::Io {
            op,
            path: path.into(),
            detail: err.to_string(),
        }
    }

    pub fn parse(what: impl Into<String>, detail: impl ToString) -> Self {
        CheckError::Parse {
            what: what.into(),
            detail: detail.to_string(),
        }
    }
}

/// Degrade a failed signal to its empty value.
pub trait OrEmpty<T> {
    fn or_empty(self, signal: &str) -> T;
}

impl<T: Default> OrEmpty<T> for Result<T, CheckError> {
    fn or_empty(self, signal: &str) -> T {
        match self {
            Ok(value) => value,
            Err(err) => {
                debug!(signal, err = %err, "signal unavailable, treating as empty");
                T::default()
            }
        }
    }
}
