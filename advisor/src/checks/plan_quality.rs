//! Plan quality: score a freshly written plan before work starts.

use std::path::PathBuf;
use std::time::Duration;

use crate::checks::{AdvisoryCheck, CheckContext};
use crate::core::quality::{QualityReport, render_quality_alert, validate_plan};
use crate::core::types::Decision;
use crate::error::CheckError;
use crate::io::plans::{read_plan, recent_plan};

pub struct PlanQuality;

impl PlanQuality {
    fn recent(ctx: &CheckContext<'_>) -> Result<Option<PathBuf>, CheckError> {
        let window = Duration::from_secs(ctx.config.windows.plan_quality_secs);
        recent_plan(&ctx.paths.tasks_dir, window, ctx.now_system())
    }
}

impl AdvisoryCheck for PlanQuality {
    fn name(&self) -> &'static str {
        "plan-quality"
    }

    fn should_run(&self, ctx: &CheckContext<'_>) -> bool {
        matches!(Self::recent(ctx), Ok(Some(_)))
    }

    fn evaluate(&self, ctx: &CheckContext<'_>) -> Result<Decision, CheckError> {
        let Some(path) = Self::recent(ctx)? else {
            return Ok(Decision::proceed());
        };
        let report = match read_plan(&path) {
            Ok(plan) => validate_plan(&plan),
            Err(_) => QualityReport::unreadable(),
        };
        if !report.has_issues() {
            return Ok(Decision::proceed());
        }
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Decision::alert(render_quality_alert(&name, &report)))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration as ChronoDuration, Local};

    use super::*;
    use crate::checks::run_check;
    use crate::core::types::Action;
    use crate::io::config::AdvisorConfig;
    use crate::test_support::{FakeRunner, write_plan};

    #[test]
    fn stale_plan_is_ignored() {
        let temp = tempfile::tempdir().expect("tempdir");
        write_plan(temp.path(), "T-1", "too short");
        let config = AdvisorConfig::default();
        let runner = FakeRunner::new();
        let later = Local::now() + ChronoDuration::seconds(600);
        let ctx = CheckContext::new(temp.path(), &config, &runner, later);

        assert!(!PlanQuality.should_run(&ctx));
        assert_eq!(run_check(&PlanQuality, &ctx), Decision::proceed());
    }

    #[test]
    fn thin_fresh_plan_alerts_with_score() {
        let temp = tempfile::tempdir().expect("tempdir");
        write_plan(temp.path(), "T-1", "## Context\nAdd login.\n");
        let config = AdvisorConfig::default();
        let runner = FakeRunner::new();
        let ctx = CheckContext::new(temp.path(), &config, &runner, Local::now());

        let decision = run_check(&PlanQuality, &ctx);
        assert_eq!(decision.action, Action::Alert);
        let message = decision.message.expect("message");
        assert!(message.starts_with("Plan quality issues detected!\nPlan: plan-t-1.md\n"));
        // 40 (two sections) + 15 + 15 + 10 + 10 + 10 + 5 = 105 → clamped.
        assert!(message.contains("Quality score: 0/100"));
        assert!(message.contains("• Add missing sections to provide complete plan structure"));
    }
}
