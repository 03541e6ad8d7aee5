//! Advisory checks for AI-assisted, task-tracked development.
//!
//! Each check inspects lightweight project state (git, `tasks/tasks.json`,
//! markdown plans, lint/compile/test output) and emits one decision:
//! `continue`, `alert` or `block`. The crate keeps a strict separation:
//!
//! - **[`core`]**: Pure scoring logic over collected signals. No I/O, fully
//!   testable in isolation.
//! - **[`io`]**: Side-effecting collectors (processes, git, plan files,
//!   bounded history logs). External commands go through an injected
//!   [`io::process::CommandRunner`].
//!
//! [`checks`] wires gates, collectors and scorers into the seven checks the
//! binary exposes.

pub mod checks;
pub mod core;
pub mod error;
pub mod exit_codes;
pub mod io;
pub mod logging;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
