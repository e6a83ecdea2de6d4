// src/sched/scheduler.rs

//! The scheduler core: a synchronous, single-owner state machine.
//!
//! The scheduler owns the graph and is the only mutator of vertex states,
//! the in-flight counter, and the terminal flag. It performs no IO and knows
//! nothing about how tasks execute; callers feed completions in through
//! [`Scheduler::on_task_success`] / [`Scheduler::on_task_failure`] (or the
//! [`Scheduler::set_state`] escape hatch) and act on the returned
//! [`SchedulerStep`]. Completion delivery must be serialized; the async
//! layer does this by funnelling everything through one event loop.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::dag::{Graph, VertexId, VertexState};
use crate::errors::{DagrunError, Result};
use crate::sched::snapshot::SchedulerSnapshot;
use crate::sched::step::{CampaignOutcome, SchedulerStep};

/// Per-scheduler policy knobs.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Human-readable name, used for logging alongside the guid.
    pub name: String,
    /// Hard cap on concurrently in-progress vertices; 0 means unbounded.
    pub max_concurrent: usize,
    /// Terminate the campaign on the first failure instead of draining
    /// independent branches.
    pub quit_on_failure: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            name: "dagrun".to_string(),
            max_concurrent: 0,
            quit_on_failure: false,
        }
    }
}

pub struct Scheduler {
    guid: String,
    name: String,
    graph: Graph,
    /// Iteration order for propagation and dispatch; recomputed per campaign.
    topo_order: Vec<VertexId>,
    running: bool,
    max_concurrent: usize,
    in_flight: usize,
    quit_on_failure: bool,
    /// Guards at-most-once terminal delivery per campaign.
    terminal_fired: bool,
}

impl Scheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            guid: Uuid::new_v4().to_string(),
            name: config.name,
            graph: Graph::new(),
            topo_order: Vec::new(),
            running: false,
            max_concurrent: config.max_concurrent,
            in_flight: 0,
            quit_on_failure: config.quit_on_failure,
            terminal_fired: false,
        }
    }

    pub fn guid(&self) -> &str {
        &self.guid
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn state_of(&self, id: &str) -> Option<VertexState> {
        self.graph.vertex(id).map(|v| v.state())
    }

    /// Create a vertex with an empty payload. Only meaningful before `start`.
    pub fn add_vertex(&mut self, id: &str) -> Result<()> {
        self.graph.add_vertex(id, None)
    }

    /// Declare that `end` depends on `start`.
    pub fn add_edge(&mut self, start: &str, end: &str) -> Result<()> {
        self.graph.add_edge(start, end)
    }

    /// Begin a campaign.
    ///
    /// Recomputes the topological order (failing with `CyclicGraph` when none
    /// exists), resets every vertex to not-ready, then propagates readiness
    /// and dispatches the roots. An empty graph terminates immediately with
    /// success.
    pub fn start(&mut self) -> Result<SchedulerStep> {
        let order = self.graph.topological_sort();
        if order.is_empty() && self.graph.vertex_count() > 0 {
            return Err(DagrunError::CyclicGraph);
        }
        self.topo_order = order;
        self.terminal_fired = false;
        self.in_flight = 0;
        self.running = true;

        let ids: Vec<VertexId> = self.graph.vertex_ids().map(str::to_string).collect();
        for id in &ids {
            if let Some(vertex) = self.graph.vertex_mut(id) {
                vertex.set_state(VertexState::NotReady);
            }
        }

        info!(
            sched = %self.guid,
            name = %self.name,
            vertices = self.graph.vertex_count(),
            edges = self.graph.edge_count(),
            max_concurrent = self.max_concurrent,
            quit_on_failure = self.quit_on_failure,
            "starting campaign"
        );

        self.propagate();
        if self.all_final() {
            // Nothing to run; the campaign is vacuously successful.
            return Ok(self.finish(CampaignOutcome::Success));
        }
        Ok(SchedulerStep {
            started: self.dispatch_ready(),
            outcome: None,
        })
    }

    /// Record the task's payload on the vertex, then commit `Success`.
    pub fn on_task_success(&mut self, id: &str, data: Value) -> Result<SchedulerStep> {
        let vertex = self
            .graph
            .vertex_mut(id)
            .ok_or_else(|| DagrunError::VertexNotFound(id.to_string()))?;
        vertex.set_data(data);
        self.set_state(id, VertexState::Success)
    }

    /// Commit `Failed` for the vertex. The error value is not stored here;
    /// it only surfaces through the terminal outcome.
    pub fn on_task_failure(&mut self, id: &str) -> Result<SchedulerStep> {
        self.set_state(id, VertexState::Failed)
    }

    /// Commit point for every vertex state transition.
    ///
    /// Success and failure run the full bookkeeping: in-flight accounting,
    /// propagation, terminal detection, and dispatch of newly ready
    /// vertices. Other states just transition the vertex.
    pub fn set_state(&mut self, id: &str, state: VertexState) -> Result<SchedulerStep> {
        let vertex = self
            .graph
            .vertex_mut(id)
            .ok_or_else(|| DagrunError::VertexNotFound(id.to_string()))?;
        let prev = vertex.state();
        vertex.set_state(state);
        debug!(sched = %self.guid, vertex = %id, from = %prev, to = %state, "vertex transition");

        // Keep the in-flight counter equal to the number of in-progress
        // vertices, whatever path the transition came in on.
        if prev == VertexState::InProgress && state != VertexState::InProgress {
            self.in_flight = self.in_flight.saturating_sub(1);
        }
        if state == VertexState::InProgress && prev != VertexState::InProgress {
            self.in_flight += 1;
        }

        match state {
            VertexState::Success => Ok(self.commit_success()),
            VertexState::Failed => Ok(self.commit_failure(id)),
            _ => Ok(SchedulerStep::default()),
        }
    }

    pub fn snapshot(&self) -> SchedulerSnapshot {
        let mut states: BTreeMap<String, Vec<VertexId>> = BTreeMap::new();
        for state in VertexState::ALL {
            states.insert(state.to_string(), Vec::new());
        }
        for vertex in self.graph.vertices() {
            if let Some(bucket) = states.get_mut(&vertex.state().to_string()) {
                bucket.push(vertex.id().to_string());
            }
        }
        SchedulerSnapshot {
            guid: self.guid.clone(),
            name: self.name.clone(),
            running: self.running,
            quit_on_failure: self.quit_on_failure,
            max_concurrent: self.max_concurrent,
            in_flight: self.in_flight,
            topo_order: self.topo_order.clone(),
            states,
        }
    }

    fn commit_success(&mut self) -> SchedulerStep {
        if self.terminal_fired {
            // Late completion from an abandoned campaign; absorb it.
            return SchedulerStep::default();
        }
        self.propagate();

        if self.all_final() {
            let failed = self.failed_ids();
            let outcome = if failed.is_empty() {
                CampaignOutcome::Success
            } else {
                CampaignOutcome::Failed(DagrunError::TasksFailed(failed))
            };
            return self.finish(outcome);
        }
        if self.quit_on_failure && self.any_failed() {
            let failed = self.failed_ids();
            return self.finish(CampaignOutcome::Failed(DagrunError::TasksFailed(failed)));
        }
        SchedulerStep {
            started: self.dispatch_ready(),
            outcome: None,
        }
    }

    fn commit_failure(&mut self, id: &str) -> SchedulerStep {
        if self.terminal_fired {
            return SchedulerStep::default();
        }
        warn!(sched = %self.guid, vertex = %id, "task failed; failing dependents");
        self.propagate();

        if self.quit_on_failure {
            return self.finish(CampaignOutcome::Failed(DagrunError::TaskFailed(
                id.to_string(),
            )));
        }
        if self.all_final() {
            return self.finish(CampaignOutcome::Failed(DagrunError::TasksFailed(
                self.failed_ids(),
            )));
        }
        // Independent branches keep running; a freed slot may admit another
        // ready vertex.
        SchedulerStep {
            started: self.dispatch_ready(),
            outcome: None,
        }
    }

    fn finish(&mut self, outcome: CampaignOutcome) -> SchedulerStep {
        self.running = false;
        if self.terminal_fired {
            debug!(sched = %self.guid, "terminal already delivered; absorbing");
            return SchedulerStep::default();
        }
        self.terminal_fired = true;
        info!(
            sched = %self.guid,
            success = outcome.is_success(),
            "campaign reached terminal state"
        );
        SchedulerStep {
            started: Vec::new(),
            outcome: Some(outcome),
        }
    }

    /// Derive readiness from predecessors, repeating the sweep until stable.
    ///
    /// Each sweep computes every new state from a consistent snapshot of the
    /// previous states and applies them afterwards, so a transition never
    /// influences a decision within the same sweep. Sweeping until a fixpoint
    /// makes failure fully viral in one call and the whole operation
    /// idempotent.
    fn propagate(&mut self) {
        loop {
            let mut changes: Vec<(VertexId, VertexState)> = Vec::new();
            for id in &self.topo_order {
                let Some(vertex) = self.graph.vertex(id) else {
                    continue;
                };
                if vertex.state() != VertexState::NotReady {
                    continue;
                }

                let new_state = if self.graph.indegree(id) == 0 {
                    VertexState::Ready
                } else {
                    let mut all_success = true;
                    let mut any_failed = false;
                    for parent in self.graph.parents(id) {
                        match self.state_of(parent) {
                            Some(VertexState::Success) => {}
                            Some(VertexState::Failed) => {
                                all_success = false;
                                any_failed = true;
                            }
                            _ => all_success = false,
                        }
                    }
                    if all_success {
                        VertexState::Ready
                    } else if any_failed {
                        VertexState::Failed
                    } else {
                        VertexState::NotReady
                    }
                };

                if new_state != VertexState::NotReady {
                    changes.push((id.clone(), new_state));
                }
            }

            if changes.is_empty() {
                break;
            }
            for (id, state) in changes {
                debug!(sched = %self.guid, vertex = %id, to = %state, "propagated state");
                if let Some(vertex) = self.graph.vertex_mut(&id) {
                    vertex.set_state(state);
                }
            }
        }
    }

    /// Move ready vertices to in-progress, in topological order, until the
    /// concurrency cap is hit. Suppressed entirely once the campaign is no
    /// longer running, so stale wake-ups dispatch nothing.
    fn dispatch_ready(&mut self) -> Vec<VertexId> {
        if !self.running {
            return Vec::new();
        }
        let ready: Vec<VertexId> = self
            .topo_order
            .iter()
            .filter(|id| self.state_of(id.as_str()) == Some(VertexState::Ready))
            .cloned()
            .collect();

        let mut started = Vec::new();
        for id in ready {
            if self.max_concurrent > 0 && self.in_flight >= self.max_concurrent {
                debug!(
                    sched = %self.guid,
                    in_flight = self.in_flight,
                    max_concurrent = self.max_concurrent,
                    "concurrency cap reached; deferring remaining ready vertices"
                );
                break;
            }
            self.in_flight += 1;
            if let Some(vertex) = self.graph.vertex_mut(&id) {
                vertex.set_state(VertexState::InProgress);
            }
            debug!(sched = %self.guid, vertex = %id, "dispatching vertex");
            started.push(id);
        }
        started
    }

    fn all_final(&self) -> bool {
        self.graph.vertices().all(|v| v.state().is_final())
    }

    fn any_failed(&self) -> bool {
        self.graph
            .vertices()
            .any(|v| v.state() == VertexState::Failed)
    }

    /// Ids whose state is `Failed`, in topological order.
    fn failed_ids(&self) -> Vec<VertexId> {
        self.topo_order
            .iter()
            .filter(|id| self.state_of(id.as_str()) == Some(VertexState::Failed))
            .cloned()
            .collect()
    }
}
