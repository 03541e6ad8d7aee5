//! Running external tools with a timeout and bounded output.

use std::io::{ErrorKind, Read};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

use tracing::{debug, instrument, warn};
use wait_timeout::ChildExt;

use crate::core::types::ToolOutput;
use crate::error::CheckError;

/// One external command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub workdir: PathBuf,
    pub timeout: Duration,
}

impl CommandSpec {
    /// Build a spec from an argv-style list. The first element is the program.
    pub fn from_argv(argv: &[String], workdir: impl Into<PathBuf>, timeout: Duration) -> Self {
        let (program, args) = match argv.split_first() {
            Some((program, args)) => (program.clone(), args.to_vec()),
            None => (String::new(), Vec::new()),
        };
        Self {
            program,
            args,
            workdir: workdir.into(),
            timeout,
        }
    }

    /// `program arg1 arg2 ...`, used in logs and as the fake runner's key.
    pub fn display_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

/// Capability for executing external commands.
///
/// Returns `Ok` whenever the process ran to completion, whatever its exit
/// status. Spawn failures and timeouts are errors.
pub trait CommandRunner {
    fn run(&self, spec: &CommandSpec) -> Result<ToolOutput, CheckError>;
}

/// Runs commands as real child processes.
#[derive(Debug, Clone)]
pub struct SystemRunner {
    output_limit_bytes: usize,
}

impl SystemRunner {
    pub fn new(output_limit_bytes: usize) -> Self {
        Self { output_limit_bytes }
    }
}

impl CommandRunner for SystemRunner {
    #[instrument(skip_all, fields(command = %spec.display_line(), timeout_secs = spec.timeout.as_secs()))]
    fn run(&self, spec: &CommandSpec) -> Result<ToolOutput, CheckError> {
        let tool_error = |detail: String| CheckError::Tool {
            program: spec.program.clone(),
            detail,
        };

        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .current_dir(&spec.workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        debug!("spawning child process");
        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("program not found");
                return Err(CheckError::ToolNotFound {
                    program: spec.program.clone(),
                });
            }
            Err(err) => return Err(tool_error(format!("spawn: {err}"))),
        };

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| tool_error("stdout was not piped".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| tool_error("stderr was not piped".to_string()))?;

        let limit = self.output_limit_bytes;
        let stdout_handle = thread::spawn(move || read_stream_limited(stdout, limit));
        let stderr_handle = thread::spawn(move || read_stream_limited(stderr, limit));

        let status = match child
            .wait_timeout(spec.timeout)
            .map_err(|err| tool_error(format!("wait: {err}")))?
        {
            Some(status) => status,
            None => {
                warn!("command timed out, killing");
                let _ = child.kill();
                let _ = child.wait();
                return Err(CheckError::Timeout {
                    program: spec.program.clone(),
                    timeout: spec.timeout,
                });
            }
        };

        let (stdout, stdout_truncated) = join_output(stdout_handle).map_err(tool_error)?;
        let (stderr, stderr_truncated) = join_output(stderr_handle).map_err(tool_error)?;
        if stdout_truncated > 0 || stderr_truncated > 0 {
            warn!(stdout_truncated, stderr_truncated, "output truncated");
        }

        debug!(exit_code = ?status.code(), "command finished");
        Ok(ToolOutput {
            exit_code: status.code(),
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
            stdout_truncated,
            stderr_truncated,
        })
    }
}

type StreamResult = Result<(Vec<u8>, usize), String>;

fn join_output(handle: thread::JoinHandle<StreamResult>) -> StreamResult {
    match handle.join() {
        Ok(result) => result,
        Err(_) => Err("output reader thread panicked".to_string()),
    }
}

/// Drain `reader`, keeping at most `limit` bytes. Returns the kept bytes and
/// the number discarded.
fn read_stream_limited<R: Read>(mut reader: R, limit: usize) -> StreamResult {
    let mut buf = Vec::new();
    let mut truncated = 0usize;
    let mut chunk = [0u8; 8192];

    loop {
        let n = reader
            .read(&mut chunk)
            .map_err(|err| format!("read output: {err}"))?;
        if n == 0 {
            break;
        }
        let remaining = limit.saturating_sub(buf.len());
        if remaining > 0 {
            let keep = n.min(remaining);
            buf.extend_from_slice(&chunk[..keep]);
            truncated += n.saturating_sub(keep);
        } else {
            truncated += n;
        }
    }

    Ok((buf, truncated))
}
