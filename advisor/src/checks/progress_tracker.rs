//! Progress tracking: keep the plan's progress section current and report
//! quarter milestones.

use std::time::Duration;

use serde_json::json;
use tracing::debug;

use crate::checks::{AdvisoryCheck, CheckContext};
use crate::core::plan::upsert_progress_section;
use crate::core::progress::{measure_progress, render_progress_alert, render_progress_section};
use crate::core::types::Decision;
use crate::error::CheckError;
use crate::io::history;
use crate::io::plans::{plan_path, read_plan, recent_plan, write_plan};

const HISTORY_KEY: &str = "progress_entries";
const PLAN_TIMESTAMP: &str = "%Y-%m-%d %H:%M";

pub struct ProgressTracker;

impl AdvisoryCheck for ProgressTracker {
    fn name(&self) -> &'static str {
        "progress-tracker"
    }

    fn should_run(&self, ctx: &CheckContext<'_>) -> bool {
        let window = Duration::from_secs(ctx.config.windows.progress_secs);
        matches!(
            recent_plan(&ctx.paths.tasks_dir, window, ctx.now_system()),
            Ok(Some(_))
        )
    }

    fn evaluate(&self, ctx: &CheckContext<'_>) -> Result<Decision, CheckError> {
        let tasks = ctx.load_tasks()?;
        let Some(task) = tasks.in_progress() else {
            return Ok(Decision::proceed());
        };
        let path = plan_path(&ctx.paths.tasks_dir, &task.id);
        if !path.is_file() {
            debug!(path = %path.display(), "no plan for active task");
            return Ok(Decision::proceed());
        }

        let plan = read_plan(&path)?;
        let report = measure_progress(&plan);
        let updated_at = ctx.now.format(PLAN_TIMESTAMP).to_string();
        let section = render_progress_section(&report, &updated_at);
        write_plan(&path, &upsert_progress_section(&plan, &section))?;

        history::record(
            &ctx.paths.progress_log,
            HISTORY_KEY,
            json!({
                "timestamp": ctx.now.to_rfc3339(),
                "task_id": task.id,
                "progress": report,
            }),
            ctx.config.history.progress_cap,
        );

        if report.should_alert() {
            return Ok(Decision::alert(render_progress_alert(&task.id, &report)));
        }
        Ok(Decision::proceed())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use chrono::{Duration as ChronoDuration, Local};
    use serde_json::Value;

    use super::*;
    use crate::checks::run_check;
    use crate::core::plan::PROGRESS_HEADING;
    use crate::core::types::Action;
    use crate::io::config::AdvisorConfig;
    use crate::test_support::{FakeRunner, write_plan as write_plan_fixture, write_tasks};

    fn plan(done: usize, total: usize) -> String {
        let mut plan = String::from("# Plan\n\n## Steps\n");
        for i in 1..=total {
            let marker = if i <= done { " ✓" } else { "" };
            plan.push_str(&format!("{i}. step {i}{marker}\n"));
        }
        plan.push_str("\n## Notes\nKeep it small.\n");
        plan
    }

    #[test]
    fn stale_plan_closes_the_gate_and_writes_nothing() {
        let temp = tempfile::tempdir().expect("tempdir");
        write_tasks(temp.path(), &[("T-1", "Login", "", "in-progress")]);
        let path = write_plan_fixture(temp.path(), "T-1", &plan(1, 4));
        let config = AdvisorConfig::default();
        let runner = FakeRunner::new();
        let later = Local::now() + ChronoDuration::seconds(600);
        let ctx = CheckContext::new(temp.path(), &config, &runner, later);

        assert_eq!(run_check(&ProgressTracker, &ctx), Decision::proceed());
        assert_eq!(fs::read_to_string(&path).expect("read"), plan(1, 4));
        assert!(!ctx.paths.progress_log.exists());
    }

    #[test]
    fn quarter_progress_alerts_rewrites_plan_and_logs() {
        let temp = tempfile::tempdir().expect("tempdir");
        write_tasks(temp.path(), &[("T-1", "Login", "", "in-progress")]);
        let path = write_plan_fixture(temp.path(), "T-1", &plan(1, 4));
        let config = AdvisorConfig::default();
        let runner = FakeRunner::new();
        let now = Local::now();
        let ctx = CheckContext::new(temp.path(), &config, &runner, now);

        let decision = run_check(&ProgressTracker, &ctx);
        assert_eq!(decision.action, Action::Alert);
        assert_eq!(
            decision.message.as_deref(),
            Some(
                "Progress Update:\nTask: T-1\nStep completed: 1/4\nOverall progress: 25%\nTime estimate: Getting started\nStatus: Early progress"
            )
        );

        let rewritten = fs::read_to_string(&path).expect("read");
        assert_eq!(rewritten.matches(PROGRESS_HEADING).count(), 1);
        let stamp = format!("- **Last updated:** {}", now.format(PLAN_TIMESTAMP));
        assert!(rewritten.contains(&stamp));
        assert!(rewritten.contains("## Notes\nKeep it small."));

        let doc: Value =
            serde_json::from_str(&fs::read_to_string(&ctx.paths.progress_log).expect("log"))
                .expect("json");
        let entries = doc[HISTORY_KEY].as_array().expect("entries");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["task_id"], "T-1");
        assert_eq!(entries[0]["progress"]["progress_percentage"], 25);
    }

    #[test]
    fn running_twice_keeps_a_single_section() {
        let temp = tempfile::tempdir().expect("tempdir");
        write_tasks(temp.path(), &[("T-1", "Login", "", "in-progress")]);
        let path = write_plan_fixture(temp.path(), "T-1", &plan(1, 3));
        let config = AdvisorConfig::default();
        let runner = FakeRunner::new();
        let ctx = CheckContext::new(temp.path(), &config, &runner, Local::now());

        assert_eq!(run_check(&ProgressTracker, &ctx), Decision::proceed());
        assert_eq!(run_check(&ProgressTracker, &ctx), Decision::proceed());
        let rewritten = fs::read_to_string(&path).expect("read");
        assert_eq!(rewritten.matches(PROGRESS_HEADING).count(), 1);
        assert_eq!(rewritten.matches("### Implementation Notes").count(), 1);
        assert!(rewritten.contains("- **Steps completed:** 1/3"));
    }

    #[test]
    fn fresh_plan_without_task_list_is_a_plain_continue() {
        let temp = tempfile::tempdir().expect("tempdir");
        write_plan_fixture(temp.path(), "T-1", &plan(4, 4));
        let config = AdvisorConfig::default();
        let runner = FakeRunner::new();
        let ctx = CheckContext::new(temp.path(), &config, &runner, Local::now());

        assert!(ProgressTracker.should_run(&ctx));
        assert_eq!(run_check(&ProgressTracker, &ctx), Decision::proceed());
        assert!(!ctx.paths.progress_log.exists());
    }

    #[test]
    fn planning_task_is_not_tracked() {
        let temp = tempfile::tempdir().expect("tempdir");
        write_tasks(temp.path(), &[("T-1", "Login", "", "planning")]);
        let path = write_plan_fixture(temp.path(), "T-1", &plan(2, 4));
        let config = AdvisorConfig::default();
        let runner = FakeRunner::new();
        let ctx = CheckContext::new(temp.path(), &config, &runner, Local::now());

        assert_eq!(run_check(&ProgressTracker, &ctx), Decision::proceed());
        assert_eq!(fs::read_to_string(&path).expect("read"), plan(2, 4));
    }
}
