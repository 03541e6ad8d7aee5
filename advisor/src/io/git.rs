//! Git adapter for the checks.
//!
//! Every call goes through the injected [`CommandRunner`] with the configured
//! git timeout, so tests can script repository state without a real repo.

use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, instrument};

use crate::core::types::StatusEntry;
use crate::error::CheckError;
use crate::io::process::{CommandRunner, CommandSpec};

/// Read-only view of the repository at `workdir`.
pub struct Git<'a> {
    runner: &'a dyn CommandRunner,
    workdir: PathBuf,
    timeout: Duration,
}

impl<'a> Git<'a> {
    pub fn new(runner: &'a dyn CommandRunner, workdir: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            runner,
            workdir: workdir.into(),
            timeout,
        }
    }

    /// Files touched by the last revision.
    #[instrument(skip_all)]
    pub fn changed_since_previous(&self) -> Result<Vec<String>, CheckError> {
        self.run_lines(&["diff", "--name-only", "HEAD~1"])
    }

    /// Files staged for the next commit.
    #[instrument(skip_all)]
    pub fn staged(&self) -> Result<Vec<String>, CheckError> {
        self.run_lines(&["diff", "--cached", "--name-only"])
    }

    /// Get status entries (including untracked) in porcelain format.
    #[instrument(skip_all)]
    pub fn status_porcelain(&self) -> Result<Vec<StatusEntry>, CheckError> {
        let stdout = self.run_stdout(&["status", "--porcelain"])?;
        stdout
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .map(parse_status_line)
            .collect()
    }

    /// One-line summaries of the last `count` commits, newest first.
    #[instrument(skip_all, fields(count))]
    pub fn recent_commits(&self, count: usize) -> Result<Vec<String>, CheckError> {
        let limit = format!("-{count}");
        self.run_lines(&["log", "--oneline", &limit])
    }

    fn run_lines(&self, args: &[&str]) -> Result<Vec<String>, CheckError> {
        let stdout = self.run_stdout(args)?;
        let lines: Vec<String> = stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        debug!(args = %args.join(" "), lines = lines.len(), "git output");
        Ok(lines)
    }

    fn run_stdout(&self, args: &[&str]) -> Result<String, CheckError> {
        let spec = CommandSpec {
            program: "git".to_string(),
            args: args.iter().map(|arg| arg.to_string()).collect(),
            workdir: self.workdir.clone(),
            timeout: self.timeout,
        };
        let output = self.runner.run(&spec)?;
        if !output.success() {
            return Err(CheckError::Tool {
                program: "git".to_string(),
                detail: format!("{} failed: {}", args.join(" "), output.stderr.trim()),
            });
        }
        Ok(output.stdout)
    }
}

/// Parse one porcelain line. Expects the line as git printed it, since the
/// leading status column may be a space.
fn parse_status_line(line: &str) -> Result<StatusEntry, CheckError> {
    if let Some(path) = line.strip_prefix("??") {
        return Ok(StatusEntry {
            code: "??".to_string(),
            path: path.trim().to_string(),
        });
    }
    if line.len() < 4 || !line.is_char_boundary(2) {
        return Err(CheckError::parse("git status", format!("unexpected porcelain line: '{line}'")));
    }
    let code = line[..2].to_string();
    let mut path = line[2..].trim().to_string();
    if let Some((_, new)) = path.split_once("->") {
        path = new.trim().to_string();
    }
    Ok(StatusEntry { code, path })
}
