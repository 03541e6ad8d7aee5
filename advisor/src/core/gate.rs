//! Quality gate: any type, lint or source-pattern finding blocks progress.

use crate::core::cascade::EslintFile;
use crate::core::types::{Decision, ToolOutput};
use crate::error::CheckError;

const TEST_PATH_MARKERS: &[&str] = &["test", "spec", "__tests__"];
const TODO_MARKERS: &[&str] = &["TODO", "FIXME", "XXX"];
const PATTERN_ISSUE_LIMIT: usize = 3;

/// Finding for the type-check run, if any. A missing tool is skipped.
pub fn typescript_issue(result: &Result<ToolOutput, CheckError>) -> Option<String> {
    match result {
        Ok(output) if output.success() => None,
        Ok(output) => Some(format!("TypeScript errors: {}", output.combined())),
        Err(CheckError::ToolNotFound { .. }) => None,
        Err(CheckError::Timeout { .. }) => Some("TypeScript check timed out".to_string()),
        Err(err) => Some(format!("TypeScript check failed: {err}")),
    }
}

/// Finding for the lint run, if any. Only a failing run with output counts.
/// A report cut off at the capture limit still fails the gate.
pub fn eslint_issue(result: &Result<ToolOutput, CheckError>) -> Option<String> {
    match result {
        Ok(output) if output.success() || output.stdout.trim().is_empty() => None,
        Ok(output) => match serde_json::from_str::<Vec<EslintFile>>(&output.stdout) {
            Ok(report) => {
                let count: usize = report.iter().map(|file| file.messages.len()).sum();
                (count > 0).then(|| format!("ESLint violations: {count} issues found"))
            }
            Err(_) if output.stdout_truncated > 0 => Some(format!(
                "ESLint check failed: report truncated ({} bytes)",
                output.stdout_truncated
            )),
            Err(_) if !output.stderr.trim().is_empty() => {
                Some(format!("ESLint check failed: {}", output.stderr.trim()))
            }
            Err(_) => None,
        },
        Err(CheckError::ToolNotFound { .. }) => None,
        Err(CheckError::Timeout { .. }) => Some("ESLint check timed out".to_string()),
        Err(err) => Some(format!("ESLint check failed: {err}")),
    }
}

/// Anti-patterns in one source file: stray `console.log` and open TODO markers.
pub fn source_pattern_issues(path: &str, content: &str) -> Vec<String> {
    let mut issues = Vec::new();
    let lowered = path.to_lowercase();
    let is_test = TEST_PATH_MARKERS.iter().any(|marker| lowered.contains(marker));
    if !is_test && content.contains("console.log(") {
        issues.push(format!("console.log found in {path}"));
    }
    if TODO_MARKERS.iter().any(|marker| content.contains(marker)) {
        issues.push(format!("TODO/FIXME comments found in {path}"));
    }
    issues
}

/// Pattern findings across `(path, content)` pairs, capped at three.
pub fn pattern_issues(sources: &[(String, String)]) -> Vec<String> {
    sources
        .iter()
        .flat_map(|(path, content)| source_pattern_issues(path, content))
        .take(PATTERN_ISSUE_LIMIT)
        .collect()
}

pub fn gate_decision(issues: &[String]) -> Decision {
    if issues.is_empty() {
        return Decision::proceed();
    }
    let bullets: Vec<String> = issues.iter().map(|issue| format!("• {issue}")).collect();
    Decision::block(format!(
        "Quality gate failed:\n{}\n\nPlease fix these issues before proceeding.",
        bullets.join("\n")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Action;

    fn output(code: i32, stdout: &str, stderr: &str) -> Result<ToolOutput, CheckError> {
        Ok(ToolOutput {
            exit_code: Some(code),
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
            ..Default::default()
        })
    }

    #[test]
    fn typescript_skips_missing_tool_and_reports_timeout() {
        let missing = Err(CheckError::ToolNotFound {
            program: "npx".to_string(),
        });
        assert_eq!(typescript_issue(&missing), None);

        let timed_out = Err(CheckError::Timeout {
            program: "npx".to_string(),
            timeout: std::time::Duration::from_secs(30),
        });
        assert_eq!(
            typescript_issue(&timed_out).as_deref(),
            Some("TypeScript check timed out")
        );
    }

    #[test]
    fn typescript_failure_includes_compiler_output() {
        let issue = typescript_issue(&output(2, "a.ts(1,1): error TS1005", ""));
        assert_eq!(issue.as_deref(), Some("TypeScript errors: a.ts(1,1): error TS1005"));
        assert_eq!(typescript_issue(&output(0, "", "")), None);
    }

    #[test]
    fn eslint_counts_every_message() {
        let stdout = r#"[{"filePath":"a.js","messages":[{"severity":2,"message":"x"},{"severity":1,"message":"y"}]}]"#;
        assert_eq!(
            eslint_issue(&output(1, stdout, "")).as_deref(),
            Some("ESLint violations: 2 issues found")
        );
    }

    #[test]
    fn eslint_unparsable_output_reports_stderr() {
        assert_eq!(
            eslint_issue(&output(2, "Oops", "config not found")).as_deref(),
            Some("ESLint check failed: config not found")
        );
        assert_eq!(eslint_issue(&output(2, "Oops", "")), None);
    }

    #[test]
    fn eslint_truncated_report_still_fails() {
        let report = r#"[{"filePath":"a.js","source":"const a = 1;"#;
        let result = Ok(ToolOutput {
            exit_code: Some(1),
            stdout: report.to_string(),
            stdout_truncated: 100_000,
            ..Default::default()
        });
        assert_eq!(
            eslint_issue(&result).as_deref(),
            Some("ESLint check failed: report truncated (100000 bytes)")
        );
    }

    #[test]
    fn test_files_may_log_but_not_leave_todos() {
        let issues = source_pattern_issues("src/app.test.ts", "console.log(1) // TODO");
        assert_eq!(issues, vec!["TODO/FIXME comments found in src/app.test.ts"]);

        let issues = source_pattern_issues("src/app.ts", "console.log(1)");
        assert_eq!(issues, vec!["console.log found in src/app.ts"]);
    }

    #[test]
    fn pattern_issues_cap_at_three() {
        let sources: Vec<(String, String)> = (0..4)
            .map(|i| (format!("src/f{i}.js"), "console.log(1) // FIXME".to_string()))
            .collect();
        assert_eq!(pattern_issues(&sources).len(), 3);
    }

    #[test]
    fn any_issue_blocks() {
        assert_eq!(gate_decision(&[]).action, Action::Continue);
        let decision = gate_decision(&["console.log found in a.js".to_string()]);
        assert_eq!(decision.action, Action::Block);
        assert_eq!(
            decision.message.as_deref(),
            Some(
                "Quality gate failed:\n• console.log found in a.js\n\nPlease fix these issues before proceeding."
            )
        );
    }
}
