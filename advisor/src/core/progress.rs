//! Implementation progress derived from completion markers on plan steps.

use serde::Serialize;

use crate::core::keywords::contains_any;
use crate::core::plan::{PROGRESS_HEADING, completed_step_count, step_lines};

const MILESTONE_KEYWORDS: &[&str] = &[
    "milestone",
    "phase complete",
    "major step",
    "integration point",
    "key feature",
    "core functionality",
];
const BAR_CELLS: usize = 20;
const ALERT_STRIDE: u32 = 25;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressReport {
    pub progress_percentage: u32,
    pub last_completed_step: usize,
    pub total_steps: usize,
    pub time_estimate: String,
    pub status: String,
    pub milestone_reached: bool,
}

impl ProgressReport {
    /// Alert at every 25% boundary and on completion, never at 0%.
    pub fn should_alert(&self) -> bool {
        let pct = self.progress_percentage;
        pct > 0 && (pct % ALERT_STRIDE == 0 || pct == 100)
    }
}

pub fn measure_progress(plan: &str) -> ProgressReport {
    let total_steps = step_lines(plan).len();
    let completed = completed_step_count(plan);
    let progress_percentage = if total_steps == 0 {
        0
    } else {
        ((completed * 100 / total_steps) as u32).min(100)
    };
    let (status, time_estimate) = match progress_percentage {
        100 => ("Completed", "Task finished"),
        75.. => ("Nearly complete", "Almost done"),
        50.. => ("Good progress", "On track"),
        25.. => ("Early progress", "Getting started"),
        _ => ("Just started", "Beginning implementation"),
    };

    ProgressReport {
        progress_percentage,
        last_completed_step: completed,
        total_steps,
        time_estimate: time_estimate.to_string(),
        status: status.to_string(),
        milestone_reached: contains_any(plan, MILESTONE_KEYWORDS),
    }
}

pub fn progress_bar(percentage: u32) -> String {
    let filled = BAR_CELLS * percentage.min(100) as usize / 100;
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_CELLS - filled))
}

/// Markdown for the plan's progress section. `updated_at` is preformatted.
pub fn render_progress_section(report: &ProgressReport, updated_at: &str) -> String {
    format!(
        "{PROGRESS_HEADING}\n\
         - **Steps completed:** {}/{}\n\
         - **Progress:** {}% {}\n\
         - **Status:** {}\n\
         - **Last updated:** {}\n\
         \n\
         ### Implementation Notes\n\
         - Track any deviations from the original plan here\n\
         - Note any blockers or issues encountered\n\
         - Record decisions made during implementation\n",
        report.last_completed_step,
        report.total_steps,
        report.progress_percentage,
        progress_bar(report.progress_percentage),
        report.status,
        updated_at
    )
}

pub fn render_progress_alert(task_id: &str, report: &ProgressReport) -> String {
    format!(
        "Progress Update:\nTask: {}\nStep completed: {}/{}\nOverall progress: {}%\nTime estimate: {}\nStatus: {}",
        task_id,
        report.last_completed_step,
        report.total_steps,
        report.progress_percentage,
        report.time_estimate,
        report.status
    )
}
