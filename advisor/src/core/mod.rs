//! Deterministic scoring logic shared by the checks.
//!
//! Core modules must be free of I/O side effects. They take collected signals
//! (file lists, plan text, tool output) and return analyses and rendered
//! messages suitable for tests.

pub mod cascade;
pub mod drift;
pub mod gate;
pub mod impact;
pub mod keywords;
pub mod plan;
pub mod plan_drift;
pub mod progress;
pub mod quality;
pub mod types;
