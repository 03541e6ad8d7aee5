//! Test-only helpers: a scripted command runner and project fixtures.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;

use crate::core::types::ToolOutput;
use crate::error::CheckError;
use crate::io::process::{CommandRunner, CommandSpec};

/// Command runner that answers from a table keyed by `program args...`.
///
/// Unscripted commands fail with [`CheckError::ToolNotFound`]. Every call is
/// recorded in order.
#[derive(Debug, Default)]
pub struct FakeRunner {
    responses: HashMap<String, Result<ToolOutput, CheckError>>,
    calls: RefCell<Vec<String>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output(mut self, command: &str, output: ToolOutput) -> Self {
        self.responses.insert(command.to_string(), Ok(output));
        self
    }

    /// Successful run printing `stdout`.
    pub fn with_stdout(self, command: &str, stdout: &str) -> Self {
        self.with_output(command, ok_output(stdout))
    }

    /// Run that exits with `code`.
    pub fn with_failure(self, command: &str, code: i32, stdout: &str, stderr: &str) -> Self {
        self.with_output(
            command,
            ToolOutput {
                exit_code: Some(code),
                stdout: stdout.to_string(),
                stderr: stderr.to_string(),
                ..Default::default()
            },
        )
    }

    pub fn with_error(mut self, command: &str, err: CheckError) -> Self {
        self.responses.insert(command.to_string(), Err(err));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl CommandRunner for FakeRunner {
    fn run(&self, spec: &CommandSpec) -> Result<ToolOutput, CheckError> {
        let line = spec.display_line();
        self.calls.borrow_mut().push(line.clone());
        match self.responses.get(&line) {
            Some(response) => response.clone(),
            None => Err(CheckError::ToolNotFound {
                program: spec.program.clone(),
            }),
        }
    }
}

pub fn ok_output(stdout: &str) -> ToolOutput {
    ToolOutput {
        exit_code: Some(0),
        stdout: stdout.to_string(),
        stderr: String::new(),
        ..Default::default()
    }
}

/// Write `tasks/tasks.json` with `(id, title, description, status)` rows.
pub fn write_tasks(root: &Path, tasks: &[(&str, &str, &str, &str)]) -> PathBuf {
    let rows: Vec<_> = tasks
        .iter()
        .map(|(id, title, description, status)| {
            json!({"id": id, "title": title, "description": description, "status": status})
        })
        .collect();
    let path = root.join("tasks").join("tasks.json");
    write_file(&path, &json!({ "tasks": rows }).to_string());
    path
}

/// Write `tasks/plan-<id>.md`.
pub fn write_plan(root: &Path, task_id: &str, contents: &str) -> PathBuf {
    let path = root
        .join("tasks")
        .join(format!("plan-{}.md", task_id.to_lowercase()));
    write_file(&path, contents);
    path
}

pub fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create fixture directory");
    }
    fs::write(path, contents).expect("write fixture");
}
