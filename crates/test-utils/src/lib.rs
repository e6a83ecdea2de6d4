//! Shared test helpers for `dagrun`: config builders and stub tasks.

pub mod builders;
pub mod tasks;

pub use builders::{ConfigFileBuilder, TaskConfigBuilder};
pub use tasks::{DelayedTask, ExecutionLog, NeverTask, StubTask};
