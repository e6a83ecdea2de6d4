#![allow(dead_code)]

use std::collections::BTreeMap;

use dagrun::config::{ConfigFile, OrchestratorSection, TaskConfig};

/// Builder for [`ConfigFile`] to simplify test setup.
pub struct ConfigFileBuilder {
    config: ConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: ConfigFile {
                orchestrator: OrchestratorSection::default(),
                task: BTreeMap::new(),
            },
        }
    }

    pub fn with_task(mut self, name: &str, task: TaskConfig) -> Self {
        self.config.task.insert(name.to_string(), task);
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.config.orchestrator.name = name.to_string();
        self
    }

    pub fn with_max_concurrent(mut self, max: usize) -> Self {
        self.config.orchestrator.max_concurrent = max;
        self
    }

    pub fn with_quit_on_failure(mut self, val: bool) -> Self {
        self.config.orchestrator.quit_on_failure = val;
        self
    }

    /// Return the raw config. Validation is deliberately not applied here so
    /// tests can build invalid configs on purpose.
    pub fn build(self) -> ConfigFile {
        self.config
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`TaskConfig`].
pub struct TaskConfigBuilder {
    task: TaskConfig,
}

impl TaskConfigBuilder {
    pub fn new(cmd: &str) -> Self {
        Self {
            task: TaskConfig {
                cmd: cmd.to_string(),
                after: vec![],
            },
        }
    }

    pub fn after(mut self, dep: &str) -> Self {
        self.task.after.push(dep.to_string());
        self
    }

    pub fn build(self) -> TaskConfig {
        self.task
    }
}
