// src/exec/mod.rs

//! Process-backed task implementations.
//!
//! [`command`] owns [`CommandTask`], which runs a shell command via
//! `tokio::process::Command` and reports completion through its task
//! context.

pub mod command;

pub use command::CommandTask;
