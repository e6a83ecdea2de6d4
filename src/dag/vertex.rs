// src/dag/vertex.rs

//! Vertices and their execution states.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::errors::DagrunError;

/// Public type alias for vertex ids throughout the crate.
pub type VertexId = String;

/// Execution state of a vertex within a campaign.
///
/// `Success` and `Failed` are terminal; everything else is transient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexState {
    /// Predecessors have not all finished yet.
    NotReady,
    /// Every predecessor succeeded; the vertex can be dispatched.
    Ready,
    /// The bound task is currently executing.
    InProgress,
    /// The bound task reported success.
    Success,
    /// The bound task reported failure, or an ancestor failed.
    Failed,
}

impl VertexState {
    /// All states, in lifecycle order.
    pub const ALL: [VertexState; 5] = [
        VertexState::NotReady,
        VertexState::Ready,
        VertexState::InProgress,
        VertexState::Success,
        VertexState::Failed,
    ];

    /// Whether the state is terminal for a campaign.
    pub fn is_final(self) -> bool {
        matches!(self, VertexState::Success | VertexState::Failed)
    }
}

impl fmt::Display for VertexState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VertexState::NotReady => write!(f, "not-ready"),
            VertexState::Ready => write!(f, "ready"),
            VertexState::InProgress => write!(f, "in-progress"),
            VertexState::Success => write!(f, "success"),
            VertexState::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for VertexState {
    type Err = DagrunError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "not-ready" => Ok(VertexState::NotReady),
            "ready" => Ok(VertexState::Ready),
            "in-progress" => Ok(VertexState::InProgress),
            "success" => Ok(VertexState::Success),
            "failed" => Ok(VertexState::Failed),
            other => Err(DagrunError::InvalidState(other.to_string())),
        }
    }
}

/// A vertex: an id, an execution state, and an opaque payload.
///
/// The payload is last-written-wins; the scheduler overwrites it with
/// whatever value the bound task produced on success.
#[derive(Debug, Clone)]
pub struct Vertex {
    id: VertexId,
    state: VertexState,
    data: Option<Value>,
}

impl Vertex {
    pub(crate) fn new(id: VertexId, data: Option<Value>) -> Self {
        Self {
            id,
            state: VertexState::NotReady,
            data,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> VertexState {
        self.state
    }

    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    pub(crate) fn set_state(&mut self, state: VertexState) {
        self.state = state;
    }

    pub(crate) fn set_data(&mut self, data: Value) {
        self.data = Some(data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_display_and_parse_round_trip() {
        for state in VertexState::ALL {
            let parsed: VertexState = state.to_string().parse().unwrap();
            assert_eq!(parsed, state);
        }
    }

    #[test]
    fn unknown_state_is_rejected() {
        let err = "paused".parse::<VertexState>().unwrap_err();
        assert!(matches!(err, DagrunError::InvalidState(s) if s == "paused"));
    }

    #[test]
    fn new_vertex_is_not_ready_with_no_data() {
        let v = Vertex::new("a".to_string(), None);
        assert_eq!(v.state(), VertexState::NotReady);
        assert!(v.data().is_none());
    }
}
