//! Stable exit codes for the advisor binary.

use crate::core::types::{Action, Decision};

/// `continue` or `alert`, including folded failures.
pub const OK: i32 = 0;
/// The quality gate blocked progress.
pub const BLOCKED: i32 = 1;

pub fn for_decision(decision: &Decision) -> i32 {
    match decision.action {
        Action::Block => BLOCKED,
        Action::Continue | Action::Alert => OK,
    }
}
