// src/errors.rs

//! Crate-wide error taxonomy.
//!
//! Graph-construction errors are raised synchronously at the offending call
//! site and never disturb a running campaign. Task failures flow through the
//! scheduler and surface as `TaskFailed` / `TasksFailed` in the terminal
//! callback.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DagrunError {
    #[error("vertex '{0}' already exists in the graph")]
    DuplicateVertex(String),

    #[error("vertex '{0}' not found")]
    VertexNotFound(String),

    #[error("edge '{0}' -> '{1}' already exists")]
    DuplicateEdge(String, String),

    #[error("edge '{0}' -> '{1}' not found")]
    EdgeNotFound(String, String),

    #[error("vertex '{0}' cannot depend on itself")]
    SelfLoop(String),

    #[error("'{0}' is not a valid vertex state")]
    InvalidState(String),

    #[error("graph contains a cycle; no topological order exists")]
    CyclicGraph,

    #[error("task '{0}' failed")]
    TaskFailed(String),

    #[error("tasks failed: {0:?}")]
    TasksFailed(Vec<String>),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, DagrunError>;
