// src/engine/orchestrator.rs

//! The async facade around the scheduler core.
//!
//! The orchestrator binds tasks to vertices, seeds the shared results map,
//! and drives a campaign: dispatch the initial ready set, then handle
//! completion events one at a time until the core reports a terminal
//! outcome. Because every completion passes through the single `recv` loop,
//! scheduler mutations are serialized without any locking.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::dag::VertexId;
use crate::engine::events::{CompletionHandle, RuntimeEvent, TaskOutcome};
use crate::errors::{DagrunError, Result};
use crate::sched::{CampaignOutcome, Scheduler, SchedulerConfig, SchedulerSnapshot};
use crate::task::{ResultsMap, SharedResults, Task, TaskContext};

/// Invoked exactly once per campaign with the failure (if any) and the live
/// results map.
pub type TerminalCallback = Box<dyn FnMut(Option<&DagrunError>, SharedResults) + Send>;

/// Scheduler snapshot plus a copy of the shared results.
#[derive(Debug, Clone, Serialize)]
pub struct OrchestratorState {
    #[serde(flatten)]
    pub scheduler: SchedulerSnapshot,
    pub results: ResultsMap,
}

impl fmt::Display for OrchestratorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.scheduler)?;
        let results = serde_json::to_string(&self.results).map_err(|_| fmt::Error)?;
        writeln!(f, "  results: {results}")
    }
}

pub struct Orchestrator {
    scheduler: Scheduler,
    tasks: HashMap<VertexId, Box<dyn Task>>,
    results: SharedResults,
    terminal: Option<TerminalCallback>,
}

impl Orchestrator {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            scheduler: Scheduler::new(config),
            tasks: HashMap::new(),
            results: Arc::new(Mutex::new(ResultsMap::new())),
            terminal: None,
        }
    }

    /// Register the terminal callback for subsequent campaigns.
    pub fn on_terminal<F>(&mut self, callback: F)
    where
        F: FnMut(Option<&DagrunError>, SharedResults) + Send + 'static,
    {
        self.terminal = Some(Box::new(callback));
    }

    /// Create a vertex and bind `task` to it.
    pub fn add_task(&mut self, id: &str, task: impl Task + 'static) -> Result<()> {
        self.scheduler.add_vertex(id)?;
        self.tasks.insert(id.to_string(), Box::new(task));
        Ok(())
    }

    /// Declare that `after` must wait for `before`.
    pub fn add_dependency(&mut self, before: &str, after: &str) -> Result<()> {
        self.scheduler.add_edge(before, after)
    }

    /// Live handle to the shared results map.
    pub fn results(&self) -> SharedResults {
        Arc::clone(&self.results)
    }

    /// Read access to the scheduler core (diagnostics, tests).
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn overall_state(&self) -> OrchestratorState {
        OrchestratorState {
            scheduler: self.scheduler.snapshot(),
            results: self.lock_results().clone(),
        }
    }

    /// Run one campaign to its terminal outcome.
    ///
    /// `seed` becomes the live results map handed to every task. A cyclic
    /// graph fails synchronously before any task starts. Task failures are
    /// not `Err`s: they come back as [`CampaignOutcome::Failed`] and through
    /// the terminal callback. The orchestrator can be run again afterwards;
    /// per-campaign state resets on the next call.
    pub async fn run(&mut self, seed: ResultsMap) -> Result<CampaignOutcome> {
        *self.lock_results() = seed;

        let (tx, mut rx) = mpsc::unbounded_channel::<RuntimeEvent>();

        let step = self.scheduler.start()?;
        self.dispatch(step.started, &tx);

        let mut pending = step.outcome;
        let outcome = loop {
            if let Some(outcome) = pending.take() {
                break outcome;
            }

            let Some(event) = rx.recv().await else {
                // Unreachable while we hold `tx`, but don't panic on it.
                return Err(DagrunError::Other(anyhow!(
                    "event channel closed before the campaign terminated"
                )));
            };

            let RuntimeEvent::TaskCompleted {
                vertex,
                outcome: task_outcome,
            } = event;

            let step = match task_outcome {
                TaskOutcome::Success(data) => {
                    debug!(vertex = %vertex, "task completed successfully");
                    self.lock_results().insert(vertex.clone(), data.clone());
                    self.scheduler.on_task_success(&vertex, data)
                }
                TaskOutcome::Failed(message) => {
                    warn!(vertex = %vertex, error = %message, "task reported failure");
                    self.scheduler.on_task_failure(&vertex)
                }
            };

            let step = match step {
                Ok(step) => step,
                Err(err) => {
                    warn!(vertex = %vertex, error = %err, "completion for unknown vertex; ignoring");
                    continue;
                }
            };

            self.dispatch(step.started, &tx);
            pending = step.outcome;
        };

        let error = match &outcome {
            CampaignOutcome::Success => None,
            CampaignOutcome::Failed(err) => Some(err),
        };
        if let Some(callback) = self.terminal.as_mut() {
            info!(sched = %self.scheduler.guid(), "delivering terminal callback");
            callback(error, Arc::clone(&self.results));
        }

        Ok(outcome)
    }

    fn dispatch(&mut self, started: Vec<VertexId>, tx: &mpsc::UnboundedSender<RuntimeEvent>) {
        for id in started {
            let Some(task) = self.tasks.get_mut(&id) else {
                // A vertex with no bound task can never report; fail it so
                // the campaign does not hang.
                warn!(vertex = %id, "no task bound to vertex; failing it");
                let _ = tx.send(RuntimeEvent::TaskCompleted {
                    vertex: id.clone(),
                    outcome: TaskOutcome::Failed("no task bound to vertex".to_string()),
                });
                continue;
            };
            let ctx = TaskContext::new(
                id.clone(),
                Arc::clone(&self.results),
                CompletionHandle::new(id.clone(), tx.clone()),
            );
            debug!(vertex = %id, "invoking task start");
            task.start(ctx);
        }
    }

    fn lock_results(&self) -> std::sync::MutexGuard<'_, ResultsMap> {
        self.results
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
