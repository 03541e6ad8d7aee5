//! Context drift: do the files being changed still serve the active task?

use serde::Serialize;

use crate::core::keywords::{basename, significant_words};
use crate::core::types::{Severity, Task};

const CRITICAL_FILES: &[&str] = &[
    "package.json",
    "tsconfig.json",
    ".env",
    "next.config.js",
    "next.config.ts",
];
const LISTED_UNEXPECTED: usize = 5;
const SCOPE_CREEP_FILES: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriftAnalysis {
    pub drift_detected: bool,
    pub severity: Severity,
    pub issues: Vec<String>,
    pub changed_files: Vec<String>,
    pub planned_files: Vec<String>,
    pub recommendation: String,
}

/// Compare changed files against the task's plan and description.
pub fn analyze_context_drift(
    task: &Task,
    changed_files: &[String],
    planned_files: &[String],
) -> DriftAnalysis {
    let mut issues = Vec::new();

    let unexpected: Vec<&str> = changed_files
        .iter()
        .map(String::as_str)
        .filter(|changed| {
            let name = basename(changed);
            !planned_files
                .iter()
                .any(|planned| planned.contains(name) || planned.contains(changed))
        })
        .collect();
    if !unexpected.is_empty() {
        let listed: Vec<&str> = unexpected.iter().take(LISTED_UNEXPECTED).copied().collect();
        issues.push(format!("Unexpected file changes: {}", listed.join(", ")));
        if unexpected.len() > LISTED_UNEXPECTED {
            issues.push(format!(
                "... and {} more files",
                unexpected.len() - LISTED_UNEXPECTED
            ));
        }
    }

    if changed_files.len() > SCOPE_CREEP_FILES {
        issues.push("Large number of files changed - may indicate scope creep".to_string());
    }

    let critical: Vec<&str> = changed_files
        .iter()
        .map(String::as_str)
        .filter(|path| CRITICAL_FILES.contains(&basename(path)))
        .collect();
    if !critical.is_empty() {
        issues.push(format!(
            "Critical system files modified: {}",
            critical.join(", ")
        ));
    }

    if !changed_files.is_empty() {
        let keywords = significant_words(&task.search_text());
        let file_context = changed_files.join(" ").to_lowercase();
        if !keywords.is_empty() && !keywords.iter().any(|word| file_context.contains(word)) {
            issues.push("Changed files don't seem related to task description".to_string());
        }
    }

    let severity = match issues.len() {
        0 => Severity::Low,
        1 | 2 => Severity::Medium,
        _ => Severity::High,
    };
    let recommendation = match severity {
        Severity::High => "Review task scope and update plan",
        Severity::Medium => "Monitor next changes",
        Severity::Low => "Continue as planned",
    };

    DriftAnalysis {
        drift_detected: !issues.is_empty(),
        severity,
        issues,
        changed_files: changed_files.to_vec(),
        planned_files: planned_files.to_vec(),
        recommendation: recommendation.to_string(),
    }
}

pub fn render_drift_alert(task: &Task, analysis: &DriftAnalysis) -> String {
    let title = if task.title.is_empty() {
        "Unknown"
    } else {
        task.title.as_str()
    };
    format!(
        "Context drift detected!\nTask: {} - {}\nDrift severity: {}\nIssues found: {}\nRecommendation: {}",
        task.id,
        title,
        analysis.severity,
        analysis.issues.join(", "),
        analysis.recommendation
    )
}
