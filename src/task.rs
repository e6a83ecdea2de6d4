// src/task.rs

//! The task adapter contract.
//!
//! A task is anything that can be started once per campaign and eventually
//! reports exactly one of success or failure through its [`TaskContext`].
//! The context is consumed by `succeed`/`fail`, so emitting both is
//! unrepresentable; a completion arriving after the campaign already
//! terminated is silently dropped.

use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::dag::VertexId;
use crate::engine::events::CompletionHandle;

/// The mutable results map shared by all tasks and the terminal callback.
///
/// By convention each task's success payload lands under its own vertex id;
/// tasks writing to shared keys concurrently race with each other.
pub type ResultsMap = serde_json::Map<String, Value>;

pub type SharedResults = Arc<Mutex<ResultsMap>>;

/// Everything a running task needs: its identity, the shared results, and
/// the one-shot completion handle.
#[derive(Debug)]
pub struct TaskContext {
    vertex: VertexId,
    results: SharedResults,
    completion: CompletionHandle,
}

impl TaskContext {
    pub(crate) fn new(
        vertex: VertexId,
        results: SharedResults,
        completion: CompletionHandle,
    ) -> Self {
        Self {
            vertex,
            results,
            completion,
        }
    }

    /// Id of the vertex this task is bound to.
    pub fn vertex(&self) -> &str {
        &self.vertex
    }

    /// Live handle to the shared results map.
    pub fn results(&self) -> &SharedResults {
        &self.results
    }

    /// Report success with the produced payload.
    pub fn succeed(self, data: Value) {
        self.completion.succeed(data);
    }

    /// Report failure.
    pub fn fail(self, error: impl Into<String>) {
        self.completion.fail(error);
    }
}

/// An executable unit bound to a vertex.
///
/// `start` is invoked on the orchestrator's event loop and must not block;
/// long-running work belongs in a spawned future that takes the context with
/// it and reports through it when done.
pub trait Task: Send {
    fn start(&mut self, ctx: TaskContext);
}

impl<F> Task for F
where
    F: FnMut(TaskContext) + Send,
{
    fn start(&mut self, ctx: TaskContext) {
        self(ctx)
    }
}
