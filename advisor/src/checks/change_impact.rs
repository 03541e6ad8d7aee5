//! Change impact: after a pivot, which systems and tasks are affected?

use serde_json::json;

use crate::checks::{AdvisoryCheck, CheckContext};
use crate::core::impact::{analyze_change_impact, render_impact_alert};
use crate::core::types::Decision;
use crate::error::{CheckError, OrEmpty};
use crate::io::history;

const HISTORY_KEY: &str = "impacts";

pub struct ChangeImpact;

impl ChangeImpact {
    /// Project-relative files whose change marks a pivot.
    fn pivot_files(ctx: &CheckContext<'_>) -> [String; 3] {
        let paths = &ctx.config.paths;
        [
            paths.prd.clone(),
            paths.tasks.clone(),
            paths.change_log.clone(),
        ]
    }
}

impl AdvisoryCheck for ChangeImpact {
    fn name(&self) -> &'static str {
        "change-impact"
    }

    fn should_run(&self, ctx: &CheckContext<'_>) -> bool {
        let Ok(changed) = ctx.git().changed_since_previous() else {
            return false;
        };
        Self::pivot_files(ctx)
            .iter()
            .any(|pivot| changed.contains(pivot))
    }

    fn evaluate(&self, ctx: &CheckContext<'_>) -> Result<Decision, CheckError> {
        let changed = ctx
            .git()
            .changed_since_previous()
            .or_empty("last revision diff");
        let tasks = ctx.load_tasks().or_empty("task list");

        let analysis = analyze_change_impact(&changed, &tasks.tasks);
        history::record(
            &ctx.paths.impact_log,
            HISTORY_KEY,
            json!({
                "timestamp": ctx.now.to_rfc3339(),
                "impact_analysis": analysis,
            }),
            ctx.config.history.impact_cap,
        );

        if analysis.high_impact {
            return Ok(Decision::alert(render_impact_alert(&analysis)));
        }
        Ok(Decision::proceed())
    }
}
