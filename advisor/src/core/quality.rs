//! Plan quality validation: a 0-100 score with fixed per-issue deductions.

use serde::Serialize;

use crate::core::keywords::{contains_any, count_present};
use crate::core::plan::{file_mentions, missing_sections, step_lines, word_count};

const EDGE_CASE_KEYWORDS: &[&str] = &[
    "edge case",
    "error handling",
    "validation",
    "fallback",
    "exception",
    "boundary",
    "limit",
    "timeout",
];
const TEST_KEYWORDS: &[&str] = &[
    "test", "spec", "jest", "cypress", "validate", "verify", "assert", "expect",
];
const ARCHITECTURE_KEYWORDS: &[&str] = &[
    "architecture",
    "pattern",
    "design",
    "structure",
    "component",
    "module",
    "interface",
    "abstraction",
];
const DEPENDENCY_KEYWORDS: &[&str] = &["dependencies", "prerequisite"];
const CRITICAL_MARKERS: &[&str] = &["missing", "doesn't specify", "too few", "could not"];

const MIN_STEPS: usize = 3;
const MAX_STEPS: usize = 20;
const COMPLEX_PLAN_STEPS: usize = 10;
const MIN_WORDS: usize = 200;
const MAX_WORDS: usize = 2000;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlanStats {
    pub word_count: usize,
    pub step_count: usize,
    pub file_mentions: usize,
    pub edge_case_score: usize,
    pub test_score: usize,
    pub arch_score: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QualityReport {
    pub issues: Vec<String>,
    pub recommendations: Vec<String>,
    pub critical_count: usize,
    pub quality_score: u32,
    pub plan_stats: PlanStats,
}

impl QualityReport {
    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    /// Report for a plan that could not be read at all.
    pub fn unreadable() -> Self {
        Self {
            issues: vec!["Could not read plan file".to_string()],
            recommendations: vec!["Ensure plan file is accessible".to_string()],
            critical_count: 1,
            quality_score: 0,
            plan_stats: PlanStats::default(),
        }
    }
}

struct Findings {
    issues: Vec<String>,
    recommendations: Vec<String>,
    deductions: u32,
}

impl Findings {
    fn add(&mut self, issue: String, recommendation: &str, deduction: u32) {
        self.issues.push(issue);
        self.recommendations.push(recommendation.to_string());
        self.deductions += deduction;
    }
}

pub fn validate_plan(plan: &str) -> QualityReport {
    let mut findings = Findings {
        issues: Vec::new(),
        recommendations: Vec::new(),
        deductions: 0,
    };

    let missing = missing_sections(plan);
    if !missing.is_empty() {
        findings.add(
            format!("Missing required sections: {}", missing.join(", ")),
            "Add missing sections to provide complete plan structure",
            20 * missing.len() as u32,
        );
    }

    let step_count = step_lines(plan).len();
    if step_count < MIN_STEPS {
        findings.add(
            "Plan has too few implementation steps (minimum 3 recommended)".to_string(),
            "Break down implementation into more detailed steps",
            15,
        );
    } else if step_count > MAX_STEPS {
        findings.add(
            "Plan has too many steps (may be overly complex)".to_string(),
            "Consider consolidating related steps",
            5,
        );
    }

    let mentions = file_mentions(plan);
    if mentions.is_empty() {
        findings.add(
            "Plan doesn't specify which files to modify".to_string(),
            "Add specific file paths that will be modified",
            15,
        );
    }

    let edge_case_score = count_present(plan, EDGE_CASE_KEYWORDS);
    if edge_case_score == 0 {
        findings.add(
            "Plan may not consider edge cases or error handling".to_string(),
            "Add consideration for edge cases and error scenarios",
            10,
        );
    }

    let test_score = count_present(plan, TEST_KEYWORDS);
    if test_score == 0 {
        findings.add(
            "Plan doesn't mention testing strategy".to_string(),
            "Add testing approach to validate implementation",
            10,
        );
    }

    let arch_score = count_present(plan, ARCHITECTURE_KEYWORDS);
    if arch_score == 0 && step_count > COMPLEX_PLAN_STEPS {
        findings.add(
            "Complex plan lacks architectural considerations".to_string(),
            "Add architectural design considerations",
            5,
        );
    }

    let words = word_count(plan);
    if words < MIN_WORDS {
        findings.add(
            "Plan appears too brief for proper implementation guidance".to_string(),
            "Add more detailed explanations and context",
            10,
        );
    } else if words > MAX_WORDS {
        findings.add(
            "Plan is very lengthy - may be overly complex".to_string(),
            "Consider simplifying or breaking into subtasks",
            5,
        );
    }

    if !contains_any(plan, DEPENDENCY_KEYWORDS) {
        findings.add(
            "Plan doesn't explicitly mention dependencies".to_string(),
            "Add dependency analysis section",
            5,
        );
    }

    let critical_count = findings
        .issues
        .iter()
        .filter(|issue| contains_any(issue, CRITICAL_MARKERS))
        .count();

    QualityReport {
        critical_count,
        quality_score: 100u32.saturating_sub(findings.deductions),
        issues: findings.issues,
        recommendations: findings.recommendations,
        plan_stats: PlanStats {
            word_count: words,
            step_count,
            file_mentions: mentions.len(),
            edge_case_score,
            test_score,
            arch_score,
        },
    }
}

pub fn render_quality_alert(plan_name: &str, report: &QualityReport) -> String {
    let recommendations: Vec<String> = report
        .recommendations
        .iter()
        .map(|rec| format!("• {rec}"))
        .collect();
    format!(
        "Plan quality issues detected!\nPlan: {}\nIssues found: {}\nCritical issues: {}\nQuality score: {}/100\nRecommendations:\n{}",
        plan_name,
        report.issues.len(),
        report.critical_count,
        report.quality_score,
        recommendations.join("\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A plan that meets every criterion: three sections, five steps, file
    /// mentions, edge cases, tests, dependencies, and 200-2000 words.
    fn complete_plan() -> String {
        let filler = "This paragraph explains the reasoning behind the change in enough detail. ".repeat(25);
        format!(
            "# Plan for T-1\n\n## Context\n{filler}\n\n## Steps\n\
             1. Update `src/auth/login.ts` with the new flow\n\
             2. Add validation and error handling for the edge case of expired tokens\n\
             3. Write a jest test to verify the login flow\n\
             4. Wire the component into the page layout\n\
             5. Document dependencies in the README\n\n\
             ## Acceptance Criteria\n- Users can log in\n"
        )
    }

    #[test]
    fn complete_plan_scores_full_marks() {
        let report = validate_plan(&complete_plan());
        assert!(report.issues.is_empty(), "{:?}", report.issues);
        assert_eq!(report.quality_score, 100);
        assert_eq!(report.critical_count, 0);
        assert_eq!(report.plan_stats.step_count, 5);
    }

    #[test]
    fn long_plan_with_architecture_scores_full_marks() {
        let extra: String = (6..=14)
            .map(|i| format!("{i}. Extend the session architecture for case {i}\n"))
            .collect();
        let plan = complete_plan().replace(
            "5. Document dependencies in the README\n",
            &format!("5. Document dependencies in the README\n{extra}"),
        );
        let report = validate_plan(&plan);
        assert!(report.issues.is_empty(), "{:?}", report.issues);
        assert_eq!(report.quality_score, 100);
        assert_eq!(report.plan_stats.step_count, 14);
        assert!(report.plan_stats.arch_score > 0);
    }

    #[test]
    fn empty_plan_bottoms_out_at_zero() {
        let report = validate_plan("");
        // 60 + 15 + 15 + 10 + 10 + 10 + 5 = 125 points of deductions.
        assert_eq!(report.quality_score, 0);
        assert_eq!(report.issues.len(), 7);
        assert_eq!(report.critical_count, 3);
    }

    #[test]
    fn complex_plan_without_architecture_is_flagged() {
        let steps: String = (1..=12).map(|i| format!("{i}. do thing {i}\n")).collect();
        let report = validate_plan(&steps);
        assert!(
            report
                .issues
                .contains(&"Complex plan lacks architectural considerations".to_string())
        );
    }

    #[test]
    fn unreadable_plan_is_one_critical_issue() {
        let report = QualityReport::unreadable();
        assert_eq!(report.quality_score, 0);
        assert_eq!(report.critical_count, 1);
    }

    #[test]
    fn alert_lists_recommendations_as_bullets() {
        let report = validate_plan("## Context\n## Steps\n## Acceptance Criteria\n");
        let message = render_quality_alert("plan-t-1.md", &report);
        assert!(message.starts_with("Plan quality issues detected!\nPlan: plan-t-1.md\n"));
        assert!(message.contains("\n• Break down implementation into more detailed steps"));
    }
}
