// src/engine/events.rs

//! Events flowing from tasks back into the orchestrator.
//!
//! All completions funnel through one unbounded mpsc channel and are handled
//! by a single event loop, which serializes every scheduler mutation.

use serde_json::Value;
use tokio::sync::mpsc;

use crate::dag::VertexId;

/// Terminal report of a single task.
#[derive(Debug)]
pub enum TaskOutcome {
    Success(Value),
    Failed(String),
}

/// Events consumed by the orchestrator's event loop.
#[derive(Debug)]
pub enum RuntimeEvent {
    TaskCompleted {
        vertex: VertexId,
        outcome: TaskOutcome,
    },
}

/// One-shot completion reporter handed to each dispatched task.
///
/// Consuming `self` makes double reporting impossible. If the campaign has
/// already terminated the receiving side is gone and the send result is
/// deliberately ignored: stale wake-ups are dropped.
#[derive(Debug)]
pub struct CompletionHandle {
    vertex: VertexId,
    tx: mpsc::UnboundedSender<RuntimeEvent>,
}

impl CompletionHandle {
    pub(crate) fn new(vertex: VertexId, tx: mpsc::UnboundedSender<RuntimeEvent>) -> Self {
        Self { vertex, tx }
    }

    pub fn succeed(self, data: Value) {
        let _ = self.tx.send(RuntimeEvent::TaskCompleted {
            vertex: self.vertex,
            outcome: TaskOutcome::Success(data),
        });
    }

    pub fn fail(self, error: impl Into<String>) {
        let _ = self.tx.send(RuntimeEvent::TaskCompleted {
            vertex: self.vertex,
            outcome: TaskOutcome::Failed(error.into()),
        });
    }
}
