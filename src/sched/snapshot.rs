// src/sched/snapshot.rs

//! Structured scheduler state dumps.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::dag::{VertexId, VertexState};

/// Point-in-time view of the scheduler: identity, policy, and the vertex ids
/// bucketed by state.
#[derive(Debug, Clone, Serialize)]
pub struct SchedulerSnapshot {
    pub guid: String,
    pub name: String,
    pub running: bool,
    pub quit_on_failure: bool,
    /// 0 means unbounded.
    pub max_concurrent: usize,
    pub in_flight: usize,
    pub topo_order: Vec<VertexId>,
    pub states: BTreeMap<String, Vec<VertexId>>,
}

impl SchedulerSnapshot {
    /// Ids currently in the given state bucket.
    pub fn bucket(&self, state: VertexState) -> &[VertexId] {
        self.states
            .get(&state.to_string())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

impl fmt::Display for SchedulerSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "scheduler '{}' ({})", self.name, self.guid)?;
        writeln!(
            f,
            "  running: {}, in_flight: {}, max_concurrent: {}, quit_on_failure: {}",
            self.running, self.in_flight, self.max_concurrent, self.quit_on_failure
        )?;
        writeln!(f, "  topological order: {:?}", self.topo_order)?;
        for state in VertexState::ALL {
            let ids = self.bucket(state);
            if !ids.is_empty() {
                writeln!(f, "  {state}: {ids:?}")?;
            }
        }
        Ok(())
    }
}
