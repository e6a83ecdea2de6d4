// src/config/validate.rs

use crate::config::model::ConfigFile;
use crate::dag::Graph;
use crate::errors::{DagrunError, Result};

/// Run semantic validation against a loaded configuration.
///
/// This checks:
/// - there is at least one task
/// - all `after` dependencies refer to existing tasks
/// - no task depends on itself
/// - the task graph has no cycles
pub fn validate_config(cfg: &ConfigFile) -> Result<()> {
    ensure_has_tasks(cfg)?;
    validate_task_dependencies(cfg)?;
    task_graph(cfg)?;
    Ok(())
}

/// Build the dependency [`Graph`] described by the config.
///
/// Edge direction: dependency -> task. For
///
/// ```toml
/// [task.b]
/// after = ["a"]
/// ```
///
/// the edge `a -> b` is added. Fails with `CyclicGraph` when the result
/// admits no topological order.
pub fn task_graph(cfg: &ConfigFile) -> Result<Graph> {
    let mut graph = Graph::new();

    for name in cfg.task.keys() {
        graph.add_vertex(name, None)?;
    }
    for (name, task) in cfg.task.iter() {
        for dep in task.after.iter() {
            graph.add_edge(dep, name)?;
        }
    }

    if graph.topological_sort().is_empty() && graph.vertex_count() > 0 {
        return Err(DagrunError::CyclicGraph);
    }
    Ok(graph)
}

fn ensure_has_tasks(cfg: &ConfigFile) -> Result<()> {
    if cfg.task.is_empty() {
        return Err(DagrunError::Config(
            "config must contain at least one [task.<name>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_task_dependencies(cfg: &ConfigFile) -> Result<()> {
    for (name, task) in cfg.task.iter() {
        for dep in task.after.iter() {
            if !cfg.task.contains_key(dep) {
                return Err(DagrunError::Config(format!(
                    "task '{name}' has unknown dependency '{dep}' in `after`"
                )));
            }
            if dep == name {
                return Err(DagrunError::SelfLoop(name.clone()));
            }
        }
    }
    Ok(())
}
