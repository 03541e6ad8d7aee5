//! I/O helpers for the checks: processes, git, project files and logs.

pub mod config;
pub mod git;
pub mod history;
pub mod plans;
pub mod process;
pub mod source_scan;
pub mod tasks;
