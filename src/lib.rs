// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod sched;
pub mod task;

use std::path::PathBuf;

use anyhow::anyhow;
use tracing::{error, info};

use crate::cli::CliArgs;
use crate::config::{load_and_validate, task_graph, ConfigFile};
use crate::exec::CommandTask;
use crate::task::ResultsMap;

pub use crate::engine::{Orchestrator, OrchestratorState};
pub use crate::errors::{DagrunError, Result};
pub use crate::sched::{CampaignOutcome, Scheduler, SchedulerConfig};
pub use crate::task::{SharedResults, Task, TaskContext};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading + validation
/// - the orchestrator with one command task per configured task
/// - a terminal callback that logs the campaign outcome
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<CampaignOutcome> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)?;

    if args.dry_run {
        print_dry_run(&cfg)?;
        return Ok(CampaignOutcome::Success);
    }

    let mut orchestrator = build_orchestrator(&cfg, &args)?;
    orchestrator.on_terminal(|outcome, results| {
        let entries = results
            .lock()
            .map(|guard| guard.len())
            .unwrap_or(0);
        match outcome {
            None => info!(result_entries = entries, "campaign succeeded"),
            Some(err) => error!(error = %err, result_entries = entries, "campaign failed"),
        }
    });

    tokio::select! {
        outcome = orchestrator.run(ResultsMap::new()) => outcome,
        _ = tokio::signal::ctrl_c() => {
            info!("interrupted; abandoning campaign");
            Err(DagrunError::Other(anyhow!("interrupted by Ctrl-C")))
        }
    }
}

/// Build an [`Orchestrator`] from a validated config, applying CLI overrides.
pub fn build_orchestrator(cfg: &ConfigFile, args: &CliArgs) -> Result<Orchestrator> {
    let scheduler_config = SchedulerConfig {
        name: cfg.orchestrator.name.clone(),
        max_concurrent: args
            .max_concurrent
            .unwrap_or(cfg.orchestrator.max_concurrent),
        quit_on_failure: args.quit_on_failure || cfg.orchestrator.quit_on_failure,
    };

    let mut orchestrator = Orchestrator::new(scheduler_config);
    for (name, task) in cfg.task.iter() {
        orchestrator.add_task(name, CommandTask::new(task.cmd.as_str()))?;
    }
    for (name, task) in cfg.task.iter() {
        for dep in task.after.iter() {
            orchestrator.add_dependency(dep, name)?;
        }
    }
    Ok(orchestrator)
}

/// Simple dry-run output: print tasks, deps, and the execution order.
fn print_dry_run(cfg: &ConfigFile) -> Result<()> {
    println!("dagrun dry-run");
    println!("  orchestrator.name = {}", cfg.orchestrator.name);
    println!(
        "  orchestrator.max_concurrent = {}",
        cfg.orchestrator.max_concurrent
    );
    println!(
        "  orchestrator.quit_on_failure = {}",
        cfg.orchestrator.quit_on_failure
    );
    println!();

    println!("tasks ({}):", cfg.task.len());
    for (name, task) in cfg.task.iter() {
        println!("  - {name}");
        println!("      cmd: {}", task.cmd);
        if !task.after.is_empty() {
            println!("      after: {:?}", task.after);
        }
    }

    let graph = task_graph(cfg)?;
    println!();
    println!("execution order: {:?}", graph.topological_sort());
    Ok(())
}
