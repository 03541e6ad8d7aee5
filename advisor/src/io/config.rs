//! Advisor configuration, read from an optional TOML file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// Advisor configuration (TOML).
///
/// Every field has a default, and the defaults reproduce the fixed project
/// layout the checks were written against. A config file only needs the
/// fields it changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AdvisorConfig {
    pub paths: PathsConfig,
    pub timeouts: TimeoutsConfig,
    pub tools: ToolsConfig,
    pub windows: WindowsConfig,
    pub history: HistoryConfig,

    /// Keep at most this many bytes of each tool's stdout/stderr.
    pub output_limit_bytes: usize,

    /// Pause before scanning for cascading errors, in milliseconds.
    pub settle_millis: u64,
}

/// Project-relative locations of the files the checks read and write.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PathsConfig {
    pub tasks: String,
    pub tasks_dir: String,
    pub prd: String,
    pub change_log: String,
    pub impact_log: String,
    pub progress_log: String,
}

/// Per-command timeouts in seconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TimeoutsConfig {
    pub git_secs: u64,
    pub typescript_secs: u64,
    pub eslint_secs: u64,
    pub tests_secs: u64,
}

/// argv for each external tool, e.g. `["npx","tsc","--noEmit"]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ToolsConfig {
    pub typescript: Vec<String>,
    pub eslint: Vec<String>,
    pub tests: Vec<String>,
}

/// How recently a plan must have been modified to trigger a check.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WindowsConfig {
    pub plan_quality_secs: u64,
    pub progress_secs: u64,
}

/// Entry caps for the bounded JSON logs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HistoryConfig {
    pub impact_cap: usize,
    pub progress_cap: usize,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            paths: PathsConfig::default(),
            timeouts: TimeoutsConfig::default(),
            tools: ToolsConfig::default(),
            windows: WindowsConfig::default(),
            history: HistoryConfig::default(),
            output_limit_bytes: 200_000,
            settle_millis: 2_000,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            tasks: "tasks/tasks.json".to_string(),
            tasks_dir: "tasks".to_string(),
            prd: "docs/prd.md".to_string(),
            change_log: "docs/change-log.md".to_string(),
            impact_log: "docs/change-impact-log.json".to_string(),
            progress_log: "tasks/progress-log.json".to_string(),
        }
    }
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        Self {
            git_secs: 10,
            typescript_secs: 30,
            eslint_secs: 30,
            tests_secs: 60,
        }
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            typescript: argv(&["npx", "tsc", "--noEmit"]),
            eslint: argv(&["npx", "eslint", ".", "--format", "json"]),
            tests: argv(&["npm", "test", "--silent"]),
        }
    }
}

impl Default for WindowsConfig {
    fn default() -> Self {
        Self {
            plan_quality_secs: 300,
            progress_secs: 120,
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            impact_cap: 50,
            progress_cap: 100,
        }
    }
}

fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|part| part.to_string()).collect()
}

impl TimeoutsConfig {
    pub fn git(&self) -> Duration {
        Duration::from_secs(self.git_secs)
    }

    pub fn typescript(&self) -> Duration {
        Duration::from_secs(self.typescript_secs)
    }

    pub fn eslint(&self) -> Duration {
        Duration::from_secs(self.eslint_secs)
    }

    pub fn tests(&self) -> Duration {
        Duration::from_secs(self.tests_secs)
    }
}

/// Absolute locations resolved against a project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPaths {
    pub root: PathBuf,
    pub tasks: PathBuf,
    pub tasks_dir: PathBuf,
    pub prd: PathBuf,
    pub change_log: PathBuf,
    pub impact_log: PathBuf,
    pub progress_log: PathBuf,
}

impl PathsConfig {
    pub fn resolve(&self, root: &Path) -> ProjectPaths {
        ProjectPaths {
            root: root.to_path_buf(),
            tasks: root.join(&self.tasks),
            tasks_dir: root.join(&self.tasks_dir),
            prd: root.join(&self.prd),
            change_log: root.join(&self.change_log),
            impact_log: root.join(&self.impact_log),
            progress_log: root.join(&self.progress_log),
        }
    }
}

impl AdvisorConfig {
    pub fn validate(&self) -> Result<()> {
        let timeouts = [
            ("timeouts.git_secs", self.timeouts.git_secs),
            ("timeouts.typescript_secs", self.timeouts.typescript_secs),
            ("timeouts.eslint_secs", self.timeouts.eslint_secs),
            ("timeouts.tests_secs", self.timeouts.tests_secs),
            ("windows.plan_quality_secs", self.windows.plan_quality_secs),
            ("windows.progress_secs", self.windows.progress_secs),
        ];
        for (name, value) in timeouts {
            if value == 0 {
                return Err(anyhow!("{name} must be > 0"));
            }
        }
        if self.history.impact_cap == 0 {
            return Err(anyhow!("history.impact_cap must be > 0"));
        }
        if self.history.progress_cap == 0 {
            return Err(anyhow!("history.progress_cap must be > 0"));
        }
        if self.output_limit_bytes == 0 {
            return Err(anyhow!("output_limit_bytes must be > 0"));
        }
        let tools = [
            ("tools.typescript", &self.tools.typescript),
            ("tools.eslint", &self.tools.eslint),
            ("tools.tests", &self.tools.tests),
        ];
        for (name, command) in tools {
            if command.is_empty() || command[0].trim().is_empty() {
                return Err(anyhow!("{name} must be a non-empty array"));
            }
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `AdvisorConfig::default()`.
pub fn load_config(path: &Path) -> Result<AdvisorConfig> {
    if !path.exists() {
        let cfg = AdvisorConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: AdvisorConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}
