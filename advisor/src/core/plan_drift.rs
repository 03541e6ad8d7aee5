//! Plan drift: is the work in the tree still the work the plan describes?

use std::fmt;

use serde::Serialize;

use crate::core::keywords::{basename, contains_any};
use crate::core::types::{Severity, StatusEntry};

const DRIFT_COMMIT_KEYWORDS: &[&str] = &[
    "refactor",
    "fix",
    "debug",
    "change approach",
    "different",
    "pivot",
    "rework",
];
const HIGH_IMPACT_KEYWORDS: &[&str] = &["scope", "technology", "architecture", "multiple"];

/// Technology → plan keywords that show it was planned for.
const TECH_KEYWORDS: &[(&str, &[&str])] = &[
    ("react", &["react", "jsx", "tsx"]),
    ("vue", &["vue", "vuex"]),
    ("angular", &["angular", "ng"]),
    ("express", &["express", "app.js"]),
    ("fastapi", &["fastapi", "uvicorn"]),
    ("database", &["mongoose", "prisma", "sequelize", "sqlite", "postgres"]),
    ("testing", &["jest", "cypress", "mocha", "vitest"]),
];

const LISTED_UNPLANNED: usize = 3;
const SCOPE_FACTOR: f64 = 1.5;

/// Working-tree changes plus recent history, as seen by git.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChangeSet {
    pub modified_files: Vec<String>,
    pub added_files: Vec<String>,
    pub deleted_files: Vec<String>,
    pub recent_commits: Vec<String>,
}

impl ChangeSet {
    /// Bucket porcelain entries by their XY code. Untracked files are ignored.
    pub fn from_status(entries: &[StatusEntry], recent_commits: Vec<String>) -> Self {
        let mut changes = ChangeSet {
            recent_commits,
            ..ChangeSet::default()
        };
        for entry in entries {
            let path = entry.path.clone();
            if entry.code.contains('M') {
                changes.modified_files.push(path);
            } else if entry.code.contains('A') {
                changes.added_files.push(path);
            } else if entry.code.contains('D') {
                changes.deleted_files.push(path);
            }
        }
        changes
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DriftType {
    #[serde(rename = "Scope Expansion")]
    ScopeExpansion,
    #[serde(rename = "Technology Change")]
    TechnologyChange,
    #[serde(rename = "Approach Change")]
    ApproachChange,
    #[serde(rename = "File Deviation")]
    FileDeviation,
    #[serde(rename = "General Drift")]
    General,
}

impl DriftType {
    fn hint(self) -> Option<&'static str> {
        match self {
            DriftType::ScopeExpansion => Some("Consider breaking into subtasks"),
            DriftType::TechnologyChange => Some("Update plan with new technology stack"),
            DriftType::ApproachChange => Some("Document rationale for approach changes"),
            DriftType::FileDeviation => Some("Add new files to plan documentation"),
            DriftType::General => None,
        }
    }
}

impl fmt::Display for DriftType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DriftType::ScopeExpansion => "Scope Expansion",
            DriftType::TechnologyChange => "Technology Change",
            DriftType::ApproachChange => "Approach Change",
            DriftType::FileDeviation => "File Deviation",
            DriftType::General => "General Drift",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanDriftAnalysis {
    pub task_id: String,
    pub drift_type: DriftType,
    pub severity: Severity,
    pub issues: Vec<String>,
    pub recommendation: String,
}

/// Drift issues found comparing the plan with the change set. Empty means none.
pub fn drift_issues(plan: &str, planned_files: &[String], changes: &ChangeSet) -> Vec<String> {
    let mut issues = Vec::new();

    let unplanned: Vec<&str> = changes
        .modified_files
        .iter()
        .map(String::as_str)
        .filter(|file| !file_matches_plan(file, planned_files))
        .collect();
    if !unplanned.is_empty() {
        let listed: Vec<&str> = unplanned.iter().take(LISTED_UNPLANNED).copied().collect();
        issues.push(format!("Modified files not in plan: {}", listed.join(", ")));
        if unplanned.len() > LISTED_UNPLANNED {
            issues.push(format!(
                "... and {} more unplanned files",
                unplanned.len() - LISTED_UNPLANNED
            ));
        }
    }

    let touched = changes.modified_files.len() + changes.added_files.len();
    if touched as f64 > planned_files.len() as f64 * SCOPE_FACTOR {
        issues.push("Implementation scope appears larger than planned".to_string());
    }

    let drifting_commits = changes
        .recent_commits
        .iter()
        .filter(|commit| contains_any(commit, DRIFT_COMMIT_KEYWORDS))
        .count();
    match drifting_commits {
        0 => {}
        1 => issues.push("Recent commits suggest approach deviation".to_string()),
        _ => issues.push("Recent commits suggest multiple approach changes".to_string()),
    }

    issues.extend(technology_drift(plan, &changes.modified_files));
    issues
}

/// A changed file matches when a planned file shares its path or basename,
/// or either basename occurs inside the other path.
pub fn file_matches_plan(changed: &str, planned_files: &[String]) -> bool {
    let changed_name = basename(changed);
    planned_files.iter().any(|planned| {
        let planned_name = basename(planned);
        changed == planned
            || changed_name == planned_name
            || planned.contains(changed_name)
            || changed.contains(planned_name)
    })
}

fn technology_drift(plan: &str, modified_files: &[String]) -> Vec<String> {
    let planned_tech: Vec<&str> = TECH_KEYWORDS
        .iter()
        .filter(|(_, keywords)| contains_any(plan, keywords))
        .map(|(tech, _)| *tech)
        .collect();

    let mut issues: Vec<String> = Vec::new();
    for tech in modified_files.iter().filter_map(|file| infer_technology(file)) {
        if planned_tech.contains(&tech) {
            continue;
        }
        let issue = format!("Using {tech} technology not mentioned in plan");
        if !issues.contains(&issue) {
            issues.push(issue);
        }
    }
    issues
}

pub fn infer_technology(path: &str) -> Option<&'static str> {
    let lowered = path.to_lowercase();
    if lowered.contains(".vue") {
        Some("vue")
    } else if (lowered.contains(".jsx") || lowered.contains(".tsx")) && lowered.contains("react") {
        Some("react")
    } else if lowered.contains("angular") {
        Some("angular")
    } else if lowered.contains("express") || lowered.ends_with("server.js") {
        Some("express")
    } else if lowered.contains("fastapi") || lowered.contains("main.py") {
        Some("fastapi")
    } else {
        None
    }
}

pub fn drift_severity(issues: &[String]) -> Severity {
    let high_impact = issues
        .iter()
        .filter(|issue| contains_any(issue, HIGH_IMPACT_KEYWORDS))
        .count();
    if high_impact >= 2 || issues.len() >= 4 {
        Severity::High
    } else if high_impact >= 1 || issues.len() >= 2 {
        Severity::Medium
    } else {
        Severity::Low
    }
}

pub fn categorize_drift(issues: &[String]) -> DriftType {
    let text = issues.join(" ").to_lowercase();
    if text.contains("scope") {
        DriftType::ScopeExpansion
    } else if text.contains("technology") || text.contains("different") {
        DriftType::TechnologyChange
    } else if text.contains("approach") || text.contains("commits suggest") {
        DriftType::ApproachChange
    } else if text.contains("files not in plan") {
        DriftType::FileDeviation
    } else {
        DriftType::General
    }
}

pub fn drift_recommendation(severity: Severity, drift_type: DriftType) -> String {
    let base = match severity {
        Severity::High => "Stop implementation and update plan immediately",
        Severity::Medium => "Update plan to reflect actual implementation approach",
        Severity::Low => "Document deviations and continue monitoring",
    };
    match drift_type.hint() {
        Some(hint) => format!("{base}; {hint}"),
        None => base.to_string(),
    }
}

/// Full analysis, or `None` when the change set shows no drift.
pub fn analyze_plan_drift(
    task_id: &str,
    plan: &str,
    planned_files: &[String],
    changes: &ChangeSet,
) -> Option<PlanDriftAnalysis> {
    let issues = drift_issues(plan, planned_files, changes);
    if issues.is_empty() {
        return None;
    }
    let severity = drift_severity(&issues);
    let drift_type = categorize_drift(&issues);
    Some(PlanDriftAnalysis {
        task_id: task_id.to_string(),
        drift_type,
        severity,
        recommendation: drift_recommendation(severity, drift_type),
        issues,
    })
}

pub fn render_plan_drift_alert(analysis: &PlanDriftAnalysis) -> String {
    format!(
        "Plan drift detected!\nTask: {}\nDrift type: {}\nSeverity: {}\nDetails: {}\nRecommendation: {}",
        analysis.task_id,
        analysis.drift_type,
        analysis.severity,
        analysis.issues.join("; "),
        analysis.recommendation
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(code: &str, path: &str) -> StatusEntry {
        StatusEntry {
            code: code.to_string(),
            path: path.to_string(),
        }
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn status_codes_bucket_into_change_kinds() {
        let changes = ChangeSet::from_status(
            &[
                entry(" M", "src/a.ts"),
                entry("A ", "src/b.ts"),
                entry(" D", "src/c.ts"),
                entry("??", "notes.txt"),
                entry("AM", "src/d.ts"),
            ],
            Vec::new(),
        );
        assert_eq!(changes.modified_files, strings(&["src/a.ts", "src/d.ts"]));
        assert_eq!(changes.added_files, strings(&["src/b.ts"]));
        assert_eq!(changes.deleted_files, strings(&["src/c.ts"]));
    }

    #[test]
    fn planned_changes_without_drift_commits_are_clean() {
        let planned = strings(&["src/auth/login.ts", "src/auth/session.ts"]);
        let changes = ChangeSet {
            modified_files: strings(&["src/auth/login.ts"]),
            recent_commits: strings(&["abc123 add login form"]),
            ..ChangeSet::default()
        };
        assert!(analyze_plan_drift("T-1", "plan", &planned, &changes).is_none());
    }

    #[test]
    fn basename_match_counts_as_planned() {
        assert!(file_matches_plan("app/login.ts", &strings(&["src/login.ts"])));
        assert!(!file_matches_plan("src/billing.ts", &strings(&["src/login.ts"])));
    }

    #[test]
    fn scope_expansion_dominates_categorization() {
        let changes = ChangeSet {
            modified_files: strings(&["src/a.ts", "src/b.ts", "src/c.ts", "src/d.ts"]),
            recent_commits: strings(&["1 fix typo", "2 refactor auth"]),
            ..ChangeSet::default()
        };
        let analysis = analyze_plan_drift("T-2", "plan text", &strings(&["src/a.ts"]), &changes)
            .expect("drift");
        assert_eq!(
            analysis.issues,
            strings(&[
                "Modified files not in plan: src/b.ts, src/c.ts, src/d.ts",
                "Implementation scope appears larger than planned",
                "Recent commits suggest multiple approach changes",
            ])
        );
        assert_eq!(analysis.severity, Severity::High);
        assert_eq!(analysis.drift_type, DriftType::ScopeExpansion);
        assert_eq!(
            analysis.recommendation,
            "Stop implementation and update plan immediately; Consider breaking into subtasks"
        );
    }

    #[test]
    fn single_drift_commit_is_an_approach_change() {
        let changes = ChangeSet {
            recent_commits: strings(&["9f1 debug flaky login"]),
            ..ChangeSet::default()
        };
        let analysis = analyze_plan_drift("T-3", "plan", &[], &changes).expect("drift");
        assert_eq!(analysis.drift_type, DriftType::ApproachChange);
        assert_eq!(analysis.severity, Severity::Low);
    }

    #[test]
    fn unplanned_technology_is_reported_once() {
        let changes = ChangeSet {
            modified_files: strings(&["web/App.vue", "web/Nav.vue"]),
            ..ChangeSet::default()
        };
        let planned = strings(&["web/App.vue", "web/Nav.vue"]);
        let issues = drift_issues("Build the page with plain html", &planned, &changes);
        assert_eq!(issues, strings(&["Using vue technology not mentioned in plan"]));
        assert_eq!(categorize_drift(&issues), DriftType::TechnologyChange);
    }

    #[test]
    fn alert_joins_details_with_semicolons() {
        let analysis = PlanDriftAnalysis {
            task_id: "T-9".to_string(),
            drift_type: DriftType::FileDeviation,
            severity: Severity::Low,
            issues: strings(&["a", "b"]),
            recommendation: "r".to_string(),
        };
        assert_eq!(
            render_plan_drift_alert(&analysis),
            "Plan drift detected!\nTask: T-9\nDrift type: File Deviation\nSeverity: LOW\nDetails: a; b\nRecommendation: r"
        );
    }
}
