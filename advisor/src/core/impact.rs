//! Change impact: how far does a scope change (pivot) ripple?

use serde::Serialize;

use crate::core::keywords::{basename, contains_any};
use crate::core::types::Task;

/// System name → path fragments that indicate the system was touched.
const SYSTEM_PATTERNS: &[(&str, &[&str])] = &[
    ("Authentication", &["auth", "login", "session", "jwt", "oauth"]),
    ("API Layer", &["api", "endpoint", "route", "controller"]),
    ("Database", &["database", "db", "schema", "migration", "model"]),
    ("UI Components", &["component", "page", "ui", "interface"]),
    ("Build System", &["package.json", "tsconfig", "next.config", "webpack"]),
    ("Testing", &["test", "spec", "__tests__", "jest", "cypress"]),
    ("Documentation", &["readme", "docs", ".md"]),
    ("Configuration", &[".env", "config", "settings"]),
];

const CRITICAL_FILES: &[&str] = &[
    "package.json",
    "tsconfig.json",
    "next.config.js",
    "next.config.ts",
    ".env",
    ".gitignore",
    "docs/prd.md",
];

const FILE_SCORE_CAP: usize = 10;
const CRITICAL_BONUS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImpactAnalysis {
    pub high_impact: bool,
    pub affected_systems: Vec<String>,
    pub affected_tasks: Vec<String>,
    pub changed_files: Vec<String>,
    pub impact_score: usize,
    pub recommendation: String,
}

pub fn analyze_change_impact(changed_files: &[String], tasks: &[Task]) -> ImpactAnalysis {
    let affected_systems = affected_systems(changed_files);
    let affected_tasks = affected_tasks(changed_files, tasks);
    let critical = has_critical_changes(changed_files);

    let high_impact = affected_systems.len() > 2 || affected_tasks.len() > 5 || critical;
    let impact_score = affected_systems.len() * 2
        + affected_tasks.len()
        + changed_files.len().min(FILE_SCORE_CAP)
        + if critical { CRITICAL_BONUS } else { 0 };

    ImpactAnalysis {
        high_impact,
        recommendation: recommendation(high_impact, affected_tasks.len()),
        affected_systems,
        affected_tasks,
        changed_files: changed_files.to_vec(),
        impact_score,
    }
}

pub fn affected_systems(changed_files: &[String]) -> Vec<String> {
    SYSTEM_PATTERNS
        .iter()
        .filter(|(_, patterns)| changed_files.iter().any(|file| contains_any(file, patterns)))
        .map(|(system, _)| system.to_string())
        .collect()
}

/// Ids of tasks whose title or description mentions a changed file.
pub fn affected_tasks(changed_files: &[String], tasks: &[Task]) -> Vec<String> {
    tasks
        .iter()
        .filter(|task| {
            let content = task.search_text();
            changed_files.iter().any(|file| mentions_file(&content, file))
        })
        .map(|task| task.id.clone())
        .collect()
}

fn mentions_file(content: &str, file: &str) -> bool {
    let file = file.to_lowercase();
    content.contains(basename(&file))
        || content.contains(&file)
        || file
            .split('/')
            .any(|part| part.len() > 2 && content.contains(part))
}

pub fn has_critical_changes(changed_files: &[String]) -> bool {
    changed_files
        .iter()
        .any(|file| CRITICAL_FILES.contains(&basename(file)) || CRITICAL_FILES.contains(&file.as_str()))
}

fn recommendation(high_impact: bool, affected_task_count: usize) -> String {
    if !high_impact {
        return "Monitor affected tasks and update plans as needed".to_string();
    }
    let mut steps = vec![
        "Update all affected task plans immediately",
        "Review system integration points",
        "Consider breaking changes into smaller increments",
    ];
    if affected_task_count > 10 {
        steps.push("Run /sync-context to realign project state");
    }
    steps.join("; ")
}

pub fn render_impact_alert(analysis: &ImpactAnalysis) -> String {
    format!(
        "High impact change detected!\nAffected systems: {}\nTasks requiring updates: {}\nRecommendation: {}",
        analysis.affected_systems.join(", "),
        analysis.affected_tasks.len(),
        analysis.recommendation
    )
}
