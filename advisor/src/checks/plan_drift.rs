//! Plan drift: compare the dirty working tree against the active plan.

use tracing::debug;

use crate::checks::{AdvisoryCheck, CheckContext};
use crate::core::plan::file_mentions;
use crate::core::plan_drift::{ChangeSet, analyze_plan_drift, render_plan_drift_alert};
use crate::core::types::Decision;
use crate::error::{CheckError, OrEmpty};
use crate::io::plans::{plan_path, read_plan};

const RECENT_COMMITS: usize = 5;

pub struct PlanDrift;

impl AdvisoryCheck for PlanDrift {
    fn name(&self) -> &'static str {
        "plan-drift"
    }

    fn should_run(&self, ctx: &CheckContext<'_>) -> bool {
        let active = ctx
            .load_tasks()
            .is_ok_and(|tasks| tasks.in_progress().is_some());
        active
            && ctx
                .git()
                .status_porcelain()
                .is_ok_and(|entries| !entries.is_empty())
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
        let planned = file_mentions(&plan);

        let git = ctx.git();
        let changes = ChangeSet::from_status(
            &git.status_porcelain().or_empty("working tree status"),
            git.recent_commits(RECENT_COMMITS).or_empty("recent commits"),
        );

        match analyze_plan_drift(&task.id, &plan, &planned, &changes) {
            Some(analysis) => Ok(Decision::alert(render_plan_drift_alert(&analysis))),
            None => Ok(Decision::proceed()),
        }
    }
}
