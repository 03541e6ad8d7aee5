//! Error cascade detection: are new errors knock-on effects of one change?

use serde::{Deserialize, Serialize};

use crate::core::keywords::contains_any;
use crate::core::types::Severity;

const CASCADE_INDICATORS: &[&str] = &[
    "Cannot find module",
    "Property does not exist",
    "Type error",
    "Import error",
    "is not assignable to",
    "does not exist on type",
    "Cannot resolve",
];
const DEPENDENCY_WORDS: &[&str] = &["module", "import", "require", "dependency"];
const TEST_ERROR_PATTERNS: &[&str] = &["failed", "error:", "exception"];

const TYPESCRIPT_ERROR_LIMIT: usize = 10;
const TEST_ERROR_LIMIT: usize = 5;
const ESLINT_ERROR_SEVERITY: u8 = 2;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CascadeAnalysis {
    pub is_cascade: bool,
    pub risk_level: Severity,
    pub cascade_count: usize,
    pub total_errors: usize,
    pub dependency_errors: usize,
    pub cascade_ratio: f64,
    pub recommendation: String,
}

pub fn analyze_error_cascade(errors: &[String]) -> CascadeAnalysis {
    let cascade_count = errors
        .iter()
        .filter(|error| contains_any(error, CASCADE_INDICATORS))
        .count();
    let dependency_errors = errors
        .iter()
        .filter(|error| contains_any(error, DEPENDENCY_WORDS))
        .count();
    let total_errors = errors.len();
    let cascade_ratio = cascade_count as f64 / total_errors.max(1) as f64;

    let risk_level = if cascade_count > 5 || cascade_ratio > 0.7 {
        Severity::High
    } else if cascade_count > 2 || cascade_ratio > 0.4 {
        Severity::Medium
    } else {
        Severity::Low
    };
    let recommendation = match risk_level {
        Severity::High => "Stop and run cascading-debugger agent immediately",
        Severity::Medium => "Consider running cascading-debugger agent",
        Severity::Low => "Monitor next changes carefully",
    };

    CascadeAnalysis {
        is_cascade: cascade_count > 1 || cascade_ratio > 0.3,
        risk_level,
        cascade_count,
        total_errors,
        dependency_errors,
        cascade_ratio,
        recommendation: recommendation.to_string(),
    }
}

/// Compiler diagnostics: lines with a `(line,col)` location that look like errors.
pub fn parse_typescript_errors(output: &str) -> Vec<String> {
    output
        .lines()
        .filter(|line| {
            line.contains('(')
                && line.contains(')')
                && (line.to_lowercase().contains("error") || line.contains("TS"))
        })
        .map(|line| format!("TypeScript: {}", line.trim()))
        .take(TYPESCRIPT_ERROR_LIMIT)
        .collect()
}

pub fn parse_test_errors(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && contains_any(line, TEST_ERROR_PATTERNS))
        .map(|line| format!("Test: {line}"))
        .take(TEST_ERROR_LIMIT)
        .collect()
}

/// One file entry of `eslint --format json`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EslintFile {
    pub file_path: String,
    pub messages: Vec<EslintMessage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EslintMessage {
    pub severity: u8,
    pub message: String,
}

/// Error-level lint messages (severity 2), one entry per message.
pub fn eslint_errors(report: &[EslintFile]) -> Vec<String> {
    report
        .iter()
        .flat_map(|file| {
            file.messages
                .iter()
                .filter(|message| message.severity >= ESLINT_ERROR_SEVERITY)
                .map(move |message| {
                    format!("ESLint error in {}: {}", file.file_path, message.message)
                })
        })
        .collect()
}

pub fn render_cascade_alert(analysis: &CascadeAnalysis) -> String {
    format!(
        "Error cascade detected!\nNew errors: {}\nCascade risk: {}\nRecommendation: {}",
        analysis.total_errors, analysis.risk_level, analysis.recommendation
    )
}
