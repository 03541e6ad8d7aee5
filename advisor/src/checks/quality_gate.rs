//! Quality gate: block task progress while the code has known problems.

use crate::checks::{AdvisoryCheck, CheckContext};
use crate::core::gate::{eslint_issue, gate_decision, pattern_issues, typescript_issue};
use crate::core::types::Decision;
use crate::error::CheckError;
use crate::io::source_scan::sample_sources;

const SOURCE_SAMPLE: usize = 20;

pub struct QualityGate;

impl AdvisoryCheck for QualityGate {
    fn name(&self) -> &'static str {
        "quality-gate"
    }

    fn should_run(&self, ctx: &CheckContext<'_>) -> bool {
        ctx.paths.tasks.is_file()
    }

    fn evaluate(&self, ctx: &CheckContext<'_>) -> Result<Decision, CheckError> {
        let tools = &ctx.config.tools;
        let timeouts = &ctx.config.timeouts;
        let mut issues = Vec::new();

        let typescript = ctx.run_tool(&tools.typescript, timeouts.typescript());
        issues.extend(typescript_issue(&typescript));

        let eslint = ctx.run_tool(&tools.eslint, timeouts.eslint());
        issues.extend(eslint_issue(&eslint));

        let sources = sample_sources(ctx.root(), SOURCE_SAMPLE);
        issues.extend(pattern_issues(&sources));

        Ok(gate_decision(&issues))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::Local;

    use super::*;
    use crate::checks::run_check;
    use crate::core::types::Action;
    use crate::io::config::AdvisorConfig;
    use crate::test_support::{FakeRunner, write_file, write_tasks};

    #[test]
    fn no_task_list_means_no_gate() {
        let temp = tempfile::tempdir().expect("tempdir");
        write_file(&temp.path().join("src/app.js"), "console.log('hi')\n");
        let config = AdvisorConfig::default();
        let runner = FakeRunner::new();
        let ctx = CheckContext::new(temp.path(), &config, &runner, Local::now());

        assert_eq!(run_check(&QualityGate, &ctx), Decision::proceed());
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn clean_project_with_missing_tools_continues() {
        let temp = tempfile::tempdir().expect("tempdir");
        write_tasks(temp.path(), &[("T-1", "Login", "", "in-progress")]);
        write_file(&temp.path().join("src/app.ts"), "export const x = 1;\n");
        let config = AdvisorConfig::default();
        let runner = FakeRunner::new();
        let ctx = CheckContext::new(temp.path(), &config, &runner, Local::now());

        assert_eq!(run_check(&QualityGate, &ctx), Decision::proceed());
    }

    #[test]
    fn findings_block_in_order() {
        let temp = tempfile::tempdir().expect("tempdir");
        write_tasks(temp.path(), &[("T-1", "Login", "", "in-progress")]);
        write_file(&temp.path().join("src/app.js"), "console.log('debug')\n");
        write_file(&temp.path().join("src/app.test.js"), "console.log('ok')\n");
        let config = AdvisorConfig::default();
        let runner = FakeRunner::new()
            .with_error(
                "npx tsc --noEmit",
                CheckError::Timeout {
                    program: "npx".to_string(),
                    timeout: Duration::from_secs(30),
                },
            )
            .with_failure(
                "npx eslint . --format json",
                1,
                r#"[{"filePath":"src/app.js","messages":[{"severity":1,"message":"no-console"}]}]"#,
                "",
            );
        let ctx = CheckContext::new(temp.path(), &config, &runner, Local::now());

        let decision = run_check(&QualityGate, &ctx);
        assert_eq!(decision.action, Action::Block);
        assert_eq!(
            decision.message.as_deref(),
            Some(
                "Quality gate failed:\n\
                 • TypeScript check timed out\n\
                 • ESLint violations: 1 issues found\n\
                 • console.log found in src/app.js\n\
                 \n\
                 Please fix these issues before proceeding."
            )
        );
    }
}
