// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [orchestrator]
/// name = "pipeline"
/// max_concurrent = 2
/// quit_on_failure = true
///
/// [task.build]
/// cmd = "cargo build"
/// after = ["generate"]
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    /// Campaign-wide policy from `[orchestrator]`.
    #[serde(default)]
    pub orchestrator: OrchestratorSection,

    /// All tasks from `[task.<name>]`, keyed by task name.
    #[serde(default)]
    pub task: BTreeMap<String, TaskConfig>,
}

/// `[orchestrator]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct OrchestratorSection {
    /// Name used in logs next to the campaign guid.
    #[serde(default = "default_name")]
    pub name: String,

    /// Maximum number of concurrently running tasks; 0 means unbounded.
    #[serde(default)]
    pub max_concurrent: usize,

    /// Stop the whole campaign on the first task failure.
    #[serde(default)]
    pub quit_on_failure: bool,
}

fn default_name() -> String {
    "dagrun".to_string()
}

impl Default for OrchestratorSection {
    fn default() -> Self {
        Self {
            name: default_name(),
            max_concurrent: 0,
            quit_on_failure: false,
        }
    }
}

/// `[task.<name>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskConfig {
    /// The command to execute.
    pub cmd: String,

    /// Dependency list: this task waits for all tasks listed here.
    #[serde(default)]
    pub after: Vec<String>,
}
