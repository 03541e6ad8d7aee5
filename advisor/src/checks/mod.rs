//! The advisory checks and the pipeline they share.
//!
//! Each check is a cheap gate followed by an evaluation. A closed gate means
//! `continue` with no signal collection and no side effects. An evaluation
//! error never escapes: [`run_check`] folds a missing input into a plain
//! `continue` and anything else into a "Hook execution failed" `continue`.

use std::path::Path;
use std::time::SystemTime;

use chrono::{DateTime, Local};
use tracing::{debug, info_span, warn};

use crate::core::types::{Decision, TaskList, ToolOutput};
use crate::error::CheckError;
use crate::io::config::{AdvisorConfig, ProjectPaths};
use crate::io::git::Git;
use crate::io::process::{CommandRunner, CommandSpec};
use crate::io::tasks::load_task_list;

pub mod change_impact;
pub mod context_drift;
pub mod error_cascade;
pub mod plan_drift;
pub mod plan_quality;
pub mod progress_tracker;
pub mod quality_gate;

/// Everything a check may look at, injected by the caller.
pub struct CheckContext<'a> {
    pub paths: ProjectPaths,
    pub config: &'a AdvisorConfig,
    pub runner: &'a dyn CommandRunner,
    pub now: DateTime<Local>,
}

impl<'a> CheckContext<'a> {
    pub fn new(
        root: &Path,
        config: &'a AdvisorConfig,
        runner: &'a dyn CommandRunner,
        now: DateTime<Local>,
    ) -> Self {
        Self {
            paths: config.paths.resolve(root),
            config,
            runner,
            now,
        }
    }

    pub fn root(&self) -> &Path {
        &self.paths.root
    }

    pub fn git(&self) -> Git<'a> {
        Git::new(self.runner, self.root(), self.config.timeouts.git())
    }

    pub fn now_system(&self) -> SystemTime {
        SystemTime::from(self.now)
    }

    pub fn load_tasks(&self) -> Result<TaskList, CheckError> {
        load_task_list(&self.paths.tasks)
    }

    /// Run a configured tool from the project root.
    pub fn run_tool(
        &self,
        argv: &[String],
        timeout: std::time::Duration,
    ) -> Result<ToolOutput, CheckError> {
        let spec = CommandSpec::from_argv(argv, self.root(), timeout);
        self.runner.run(&spec)
    }
}

/// One gate-then-evaluate advisory check.
pub trait AdvisoryCheck {
    fn name(&self) -> &'static str;

    /// Cheap precondition. Any failure underneath counts as `false`.
    fn should_run(&self, ctx: &CheckContext<'_>) -> bool;

    fn evaluate(&self, ctx: &CheckContext<'_>) -> Result<Decision, CheckError>;
}

/// Gate, evaluate, and fold any failure into a `continue`.
pub fn run_check(check: &dyn AdvisoryCheck, ctx: &CheckContext<'_>) -> Decision {
    let _span = info_span!("check", name = check.name()).entered();
    if !check.should_run(ctx) {
        debug!("gate closed");
        return Decision::proceed();
    }
    match check.evaluate(ctx) {
        Ok(decision) => {
            debug!(action = ?decision.action, "check finished");
            decision
        }
        Err(CheckError::MissingInput { path }) => {
            debug!(path = %path.display(), "nothing to check");
            Decision::proceed()
        }
        Err(err) => {
            warn!(err = %err, "check failed");
            Decision::failed(err)
        }
    }
}

/// The checks the binary can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckKind {
    ContextDrift,
    ChangeImpact,
    ErrorCascade,
    QualityGate,
    PlanQuality,
    ProgressTracker,
    PlanDrift,
}

impl CheckKind {
    pub const ALL: [CheckKind; 7] = [
        CheckKind::ContextDrift,
        CheckKind::ChangeImpact,
        CheckKind::ErrorCascade,
        CheckKind::QualityGate,
        CheckKind::PlanQuality,
        CheckKind::ProgressTracker,
        CheckKind::PlanDrift,
    ];

    pub fn check(self) -> Box<dyn AdvisoryCheck> {
        match self {
            CheckKind::ContextDrift => Box::new(context_drift::ContextDrift),
            CheckKind::ChangeImpact => Box::new(change_impact::ChangeImpact),
            CheckKind::ErrorCascade => Box::new(error_cascade::ErrorCascade),
            CheckKind::QualityGate => Box::new(quality_gate::QualityGate),
            CheckKind::PlanQuality => Box::new(plan_quality::PlanQuality),
            CheckKind::ProgressTracker => Box::new(progress_tracker::ProgressTracker),
            CheckKind::PlanDrift => Box::new(plan_drift::PlanDrift),
        }
    }

    pub fn run(self, ctx: &CheckContext<'_>) -> Decision {
        run_check(self.check().as_ref(), ctx)
    }
}
