//! Advisory checks for AI-assisted development.
//!
//! Each subcommand runs one check against the project at `--root` and prints
//! exactly one JSON decision line to stdout. Only a `block` exits non-zero.

use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;

use advisor::checks::{CheckContext, CheckKind};
use advisor::core::types::Decision;
use advisor::exit_codes;
use advisor::io::config::load_config;
use advisor::io::process::SystemRunner;
use advisor::logging;
use anyhow::{Context, Result};
use chrono::Local;
use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use tracing::warn;

#[derive(Parser)]
#[command(
    name = "advisor",
    version,
    about = "Advisory checks for task-tracked, AI-assisted development"
)]
struct Cli {
    /// Project root to inspect.
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    /// TOML config file. Built-in defaults apply when absent.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Alert when recent changes stray from the active task.
    ContextDrift,
    /// Alert on high-impact pivots and log the impact.
    ChangeImpact,
    /// Alert when debugging is producing cascading errors.
    ErrorCascade,
    /// Block while type, lint or source-pattern problems remain.
    QualityGate,
    /// Alert on weak plans right after they are written.
    PlanQuality,
    /// Update the plan's progress section and alert at milestones.
    ProgressTracker,
    /// Alert when the working tree diverges from the active plan.
    PlanDrift,
}

impl From<Command> for CheckKind {
    fn from(command: Command) -> Self {
        match command {
            Command::ContextDrift => CheckKind::ContextDrift,
            Command::ChangeImpact => CheckKind::ChangeImpact,
            Command::ErrorCascade => CheckKind::ErrorCascade,
            Command::QualityGate => CheckKind::QualityGate,
            Command::PlanQuality => CheckKind::PlanQuality,
            Command::ProgressTracker => CheckKind::ProgressTracker,
            Command::PlanDrift => CheckKind::PlanDrift,
        }
    }
}

fn main() {
    logging::init();
    let decision = match Cli::try_parse() {
        Ok(cli) => decide(&cli),
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => {
            warn!(err = %err, "invalid arguments");
            Decision::failed(argument_error(err.kind()))
        }
    };

    match serde_json::to_string(&decision) {
        Ok(line) => println!("{line}"),
        Err(_) => println!(r#"{{"action":"continue"}}"#),
    }
    std::process::exit(exit_codes::for_decision(&decision));
}

fn argument_error(kind: ErrorKind) -> String {
    match kind {
        ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand | ErrorKind::MissingSubcommand => {
            "a check subcommand is required".to_string()
        }
        kind => kind.to_string(),
    }
}

/// Run the selected check, folding errors and panics into `continue`.
fn decide(cli: &Cli) -> Decision {
    match panic::catch_unwind(AssertUnwindSafe(|| run(cli))) {
        Ok(Ok(decision)) => decision,
        Ok(Err(err)) => {
            let detail = format!("{err:#}");
            warn!(err = %detail, "advisor failed");
            Decision::failed(detail)
        }
        Err(_) => Decision::failed("check panicked"),
    }
}

fn run(cli: &Cli) -> Result<Decision> {
    let config = match &cli.config {
        Some(path) => load_config(path).context("load config")?,
        None => Default::default(),
    };
    let runner = SystemRunner::new(config.output_limit_bytes);
    let ctx = CheckContext::new(&cli.root, &config, &runner, Local::now());
    Ok(CheckKind::from(cli.command).run(&ctx))
}
