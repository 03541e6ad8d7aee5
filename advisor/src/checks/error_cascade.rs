//! Error cascade: are fixes producing more errors than they remove?

use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use crate::checks::{AdvisoryCheck, CheckContext};
use crate::core::cascade::{
    EslintFile, analyze_error_cascade, eslint_errors, parse_test_errors, parse_typescript_errors,
    render_cascade_alert,
};
use crate::core::keywords::contains_any;
use crate::core::types::{Decision, ToolOutput};
use crate::error::CheckError;

const RECENT_COMMITS: usize = 3;
const DEBUG_KEYWORDS: &[&str] = &["fix", "debug", "error", "cascade", "debugger"];

pub struct ErrorCascade;

impl ErrorCascade {
    /// Output of a run that failed, or `None` when it passed or could not run.
    fn failed_output(result: Result<ToolOutput, CheckError>, signal: &str) -> Option<ToolOutput> {
        match result {
            Ok(output) if output.success() => None,
            Ok(output) => Some(output),
            Err(err) => {
                debug!(signal, err = %err, "tool unavailable");
                None
            }
        }
    }

    fn scan_for_errors(ctx: &CheckContext<'_>) -> Vec<String> {
        let tools = &ctx.config.tools;
        let timeouts = &ctx.config.timeouts;
        let mut errors = Vec::new();

        let typescript = ctx.run_tool(&tools.typescript, timeouts.typescript());
        if let Some(output) = Self::failed_output(typescript, "type-check") {
            errors.extend(parse_typescript_errors(&output.combined()));
        }

        let tests = ctx.run_tool(&tools.tests, timeouts.tests());
        if let Some(output) = Self::failed_output(tests, "tests") {
            errors.extend(parse_test_errors(&output.combined()));
        }

        let eslint = ctx.run_tool(&tools.eslint, timeouts.eslint());
        if let Some(output) = Self::failed_output(eslint, "lint")
            && !output.stdout.trim().is_empty()
        {
            match serde_json::from_str::<Vec<EslintFile>>(&output.stdout) {
                Ok(report) => errors.extend(eslint_errors(&report)),
                Err(_) if output.stdout_truncated > 0 => {
                    warn!(truncated = output.stdout_truncated, "lint report truncated");
                    errors.push(format!(
                        "ESLint report truncated ({} bytes)",
                        output.stdout_truncated
                    ));
                }
                Err(err) => debug!(err = %err, "lint report unreadable, treating as empty"),
            }
        }

        errors
    }
}

impl AdvisoryCheck for ErrorCascade {
    fn name(&self) -> &'static str {
        "error-cascade"
    }

    fn should_run(&self, ctx: &CheckContext<'_>) -> bool {
        ctx.git()
            .recent_commits(RECENT_COMMITS)
            .is_ok_and(|commits| contains_any(&commits.join("\n"), DEBUG_KEYWORDS))
    }

    fn evaluate(&self, ctx: &CheckContext<'_>) -> Result<Decision, CheckError> {
        if ctx.config.settle_millis > 0 {
            thread::sleep(Duration::from_millis(ctx.config.settle_millis));
        }

        let errors = Self::scan_for_errors(ctx);
        if errors.is_empty() {
            return Ok(Decision::proceed());
        }
        let analysis = analyze_error_cascade(&errors);
        debug!(
            total = analysis.total_errors,
            cascade = analysis.cascade_count,
            "cascade analysis"
        );
        if analysis.is_cascade {
            return Ok(Decision::alert(render_cascade_alert(&analysis)));
        }
        Ok(Decision::proceed())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Local;

    use super::*;
    use crate::checks::run_check;
    use crate::core::types::Action;
    use crate::io::config::AdvisorConfig;
    use crate::test_support::FakeRunner;

    fn quiet_config() -> AdvisorConfig {
        let mut config = AdvisorConfig::default();
        config.settle_millis = 0;
        config
    }

    #[test]
    fn feature_commits_close_the_gate() {
        let temp = tempfile::tempdir().expect("tempdir");
        let config = quiet_config();
        let runner = FakeRunner::new()
            .with_stdout("git log --oneline -3", "a1 add login\nb2 style footer\n");
        let ctx = CheckContext::new(temp.path(), &config, &runner, Local::now());

        assert_eq!(run_check(&ErrorCascade, &ctx), Decision::proceed());
        assert_eq!(runner.calls(), vec!["git log --oneline -3"]);
    }

    #[test]
    fn cascading_type_errors_alert() {
        let temp = tempfile::tempdir().expect("tempdir");
        let config = quiet_config();
        let tsc = "src/a.ts(1,1): error TS2307: Cannot find module './b'\n\
                   src/c.ts(4,2): error TS2339: Property does not exist on type 'X'\n\
                   src/d.ts(9,9): error TS2322: Type 'string' is not assignable to type 'number'\n";
        let runner = FakeRunner::new()
            .with_stdout("git log --oneline -3", "a1 fix imports\n")
            .with_failure("npx tsc --noEmit", 2, tsc, "")
            .with_failure("npm test --silent", 1, "", "");
        let ctx = CheckContext::new(temp.path(), &config, &runner, Local::now());

        let decision = run_check(&ErrorCascade, &ctx);
        assert_eq!(decision.action, Action::Alert);
        assert_eq!(
            decision.message.as_deref(),
            Some(
                "Error cascade detected!\nNew errors: 3\nCascade risk: HIGH\nRecommendation: Stop and run cascading-debugger agent immediately"
            )
        );
    }

    #[test]
    fn isolated_lint_error_is_not_a_cascade() {
        let temp = tempfile::tempdir().expect("tempdir");
        let config = quiet_config();
        let report = r#"[{"filePath":"src/a.js","messages":[{"severity":2,"message":"no-unused-vars"},{"severity":1,"message":"semi"}]}]"#;
        let runner = FakeRunner::new()
            .with_stdout("git log --oneline -3", "a1 debug session\n")
            .with_failure("npx eslint . --format json", 1, report, "");
        let ctx = CheckContext::new(temp.path(), &config, &runner, Local::now());

        assert_eq!(run_check(&ErrorCascade, &ctx), Decision::proceed());
        assert_eq!(
            runner.calls(),
            vec![
                "git log --oneline -3",
                "npx tsc --noEmit",
                "npm test --silent",
                "npx eslint . --format json",
            ]
        );
    }

    #[test]
    fn truncated_lint_report_still_counts_as_an_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let config = quiet_config();
        let tsc = "src/a.ts(1,1): error TS2307: Cannot find module './b'\n";
        let runner = FakeRunner::new()
            .with_stdout("git log --oneline -3", "a1 fix imports\n")
            .with_failure("npx tsc --noEmit", 2, tsc, "")
            .with_output(
                "npx eslint . --format json",
                ToolOutput {
                    exit_code: Some(1),
                    stdout: r#"[{"filePath":"src/a.js","source":"let a"#.to_string(),
                    stdout_truncated: 4096,
                    ..Default::default()
                },
            );
        let ctx = CheckContext::new(temp.path(), &config, &runner, Local::now());

        let decision = run_check(&ErrorCascade, &ctx);
        assert_eq!(decision.action, Action::Alert);
        assert_eq!(
            decision.message.as_deref(),
            Some(
                "Error cascade detected!\nNew errors: 2\nCascade risk: MEDIUM\nRecommendation: Consider running cascading-debugger agent"
            )
        );
    }
}
