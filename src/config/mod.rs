// src/config/mod.rs

//! TOML configuration: data model, loading, and semantic validation.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path};
pub use model::{ConfigFile, OrchestratorSection, TaskConfig};
pub use validate::{task_graph, validate_config};
