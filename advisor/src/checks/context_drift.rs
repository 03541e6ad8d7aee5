//! Context drift: do the latest changes still serve the active task?

use std::collections::BTreeSet;

use crate::checks::{AdvisoryCheck, CheckContext};
use crate::core::drift::{analyze_context_drift, render_drift_alert};
use crate::core::plan::file_mentions;
use crate::core::types::Decision;
use crate::error::{CheckError, OrEmpty};
use crate::io::plans::{plan_path, read_plan};

pub struct ContextDrift;

impl AdvisoryCheck for ContextDrift {
    fn name(&self) -> &'static str {
        "context-drift"
    }

    fn should_run(&self, ctx: &CheckContext<'_>) -> bool {
        ctx.load_tasks()
            .is_ok_and(|tasks| tasks.in_progress_or_planning().is_some())
    }

    fn evaluate(&self, ctx: &CheckContext<'_>) -> Result<Decision, CheckError> {
        let tasks = ctx.load_tasks()?;
        let Some(task) = tasks.in_progress_or_planning() else {
            return Ok(Decision::proceed());
        };

        let git = ctx.git();
        let changed: BTreeSet<String> = git
            .changed_since_previous()
            .or_empty("last revision diff")
            .into_iter()
            .chain(git.staged().or_empty("staged files"))
            .collect();
        let changed: Vec<String> = changed.into_iter().collect();

        let planned = read_plan(&plan_path(&ctx.paths.tasks_dir, &task.id))
            .map(|plan| file_mentions(&plan))
            .or_empty("planned files");

        let analysis = analyze_context_drift(task, &changed, &planned);
        if analysis.drift_detected {
            return Ok(Decision::alert(render_drift_alert(task, &analysis)));
        }
        Ok(Decision::proceed())
    }
}
