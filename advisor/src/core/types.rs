//! Shared records for check inputs and outputs.
//!
//! These types define the contract between collectors, scorers and the CLI.
//! They carry no I/O and serialize deterministically.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a task in `tasks/tasks.json`.
///
/// Unknown values are preserved verbatim so the task list round-trips.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskStatus {
    Pending,
    Planning,
    InProgress,
    Done,
    Other(String),
}

impl From<String> for TaskStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "pending" => TaskStatus::Pending,
            "planning" => TaskStatus::Planning,
            "in-progress" => TaskStatus::InProgress,
            "done" => TaskStatus::Done,
            _ => TaskStatus::Other(value),
        }
    }
}

impl From<TaskStatus> for String {
    fn from(value: TaskStatus) -> Self {
        match value {
            TaskStatus::Pending => "pending".to_string(),
            TaskStatus::Planning => "planning".to_string(),
            TaskStatus::InProgress => "in-progress".to_string(),
            TaskStatus::Done => "done".to_string(),
            TaskStatus::Other(other) => other,
        }
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Other(String::new())
    }
}

/// A single entry of the external task list. Read-only to the checks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
}

impl Task {
    /// Lowercased `description title`, the text keyword heuristics search.
    pub fn search_text(&self) -> String {
        format!("{} {}", self.description, self.title).to_lowercase()
    }
}

/// Top-level shape of `tasks/tasks.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskList {
    pub tasks: Vec<Task>,
}

impl TaskList {
    /// First task whose status satisfies `pred`.
    pub fn first_with<F>(&self, pred: F) -> Option<&Task>
    where
        F: Fn(&TaskStatus) -> bool,
    {
        self.tasks.iter().find(|task| pred(&task.status))
    }

    pub fn in_progress(&self) -> Option<&Task> {
        self.first_with(|status| *status == TaskStatus::InProgress)
    }

    pub fn in_progress_or_planning(&self) -> Option<&Task> {
        self.first_with(|status| {
            matches!(status, TaskStatus::InProgress | TaskStatus::Planning)
        })
    }
}

/// Parsed `git status --porcelain` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    /// 2-letter XY code, or "??" for untracked.
    pub code: String,
    /// Path for the changed file (the new path for renames).
    pub path: String,
}

/// Captured output of an external command that ran to completion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    /// Bytes dropped past the capture limit.
    pub stdout_truncated: usize,
    pub stderr_truncated: usize,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Stdout followed by stderr, trimmed.
    pub fn combined(&self) -> String {
        let mut out = self.stdout.trim().to_string();
        let err = self.stderr.trim();
        if !err.is_empty() {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(err);
        }
        out
    }
}

/// What the orchestrating caller should do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Continue,
    Alert,
    Block,
}

/// The single JSON object a check prints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub action: Action,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Decision {
    pub fn proceed() -> Self {
        Self {
            action: Action::Continue,
            message: None,
        }
    }

    pub fn alert(message: impl Into<String>) -> Self {
        Self {
            action: Action::Alert,
            message: Some(message.into()),
        }
    }

    pub fn block(message: impl Into<String>) -> Self {
        Self {
            action: Action::Block,
            message: Some(message.into()),
        }
    }

    /// The pass-through produced when a check itself breaks.
    pub fn failed(err: impl fmt::Display) -> Self {
        Self {
            action: Action::Continue,
            message: Some(format!("Hook execution failed: {err}")),
        }
    }
}

/// Severity bucket derived from a score via fixed thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
        };
        f.write_str(label)
    }
}
