use std::collections::{HashSet, VecDeque};

use proptest::prelude::*;
use serde_json::json;

use dagrun::dag::VertexState;
use dagrun::sched::{Scheduler, SchedulerConfig};

/// A random DAG description: task `i` may only depend on tasks `0..i`, which
/// guarantees acyclicity by construction.
#[derive(Debug, Clone)]
struct RandomDag {
    deps: Vec<Vec<usize>>,
    max_concurrent: usize,
    failing: Vec<usize>,
}

fn random_dag_strategy(max_tasks: usize) -> impl Strategy<Value = RandomDag> {
    (1..=max_tasks).prop_flat_map(move |num_tasks| {
        let deps = proptest::collection::vec(
            proptest::collection::vec(any::<usize>(), 0..num_tasks),
            num_tasks,
        );
        let failing = proptest::collection::vec(0..num_tasks, 0..=num_tasks.min(4));
        (deps, 0..4usize, failing).prop_map(|(raw_deps, max_concurrent, failing)| {
            let deps = raw_deps
                .into_iter()
                .enumerate()
                .map(|(i, potential)| {
                    let mut valid: HashSet<usize> = HashSet::new();
                    for dep in potential {
                        if i > 0 {
                            valid.insert(dep % i);
                        }
                    }
                    valid.into_iter().collect()
                })
                .collect();
            RandomDag {
                deps,
                max_concurrent,
                failing,
            }
        })
    })
}

fn build_scheduler(case: &RandomDag) -> Scheduler {
    let mut s = Scheduler::new(SchedulerConfig {
        name: "prop".to_string(),
        max_concurrent: case.max_concurrent,
        quit_on_failure: false,
    });
    for i in 0..case.deps.len() {
        s.add_vertex(&format!("t{i}")).unwrap();
    }
    for (i, deps) in case.deps.iter().enumerate() {
        for dep in deps {
            s.add_edge(&format!("t{dep}"), &format!("t{i}")).unwrap();
        }
    }
    s
}

proptest! {
    /// Driving any acyclic graph with any mix of failures reaches exactly one
    /// terminal outcome, never exceeds the concurrency cap, and never runs a
    /// vertex before all of its parents succeeded.
    #[test]
    fn random_dags_terminate_within_invariants(case in random_dag_strategy(10)) {
        let failing: HashSet<String> = case
            .failing
            .iter()
            .map(|i| format!("t{i}"))
            .collect();

        let mut s = build_scheduler(&case);
        let step = s.start().unwrap();

        let mut executing: VecDeque<String> = step.started.into();
        let mut terminal = step.outcome;
        let mut steps = 0;
        let max_steps = 1000;

        while terminal.is_none() && steps < max_steps {
            steps += 1;

            let task = match executing.pop_front() {
                Some(t) => t,
                None => break,
            };

            let step = if failing.contains(&task) {
                s.on_task_failure(&task).unwrap()
            } else {
                s.on_task_success(&task, json!(1)).unwrap()
            };

            if case.max_concurrent > 0 {
                prop_assert!(
                    s.in_flight() <= case.max_concurrent,
                    "cap exceeded: {} > {}",
                    s.in_flight(),
                    case.max_concurrent
                );
            }

            // Anything in progress must have only succeeded parents.
            for vertex in s.graph().vertices() {
                if vertex.state() == VertexState::InProgress {
                    for parent in s.graph().parents(vertex.id()) {
                        prop_assert_eq!(
                            s.state_of(parent),
                            Some(VertexState::Success),
                            "vertex {} runs with unfinished parent {}",
                            vertex.id(),
                            parent
                        );
                    }
                }
            }

            executing.extend(step.started);
            terminal = step.outcome;
        }

        prop_assert!(steps < max_steps, "simulation did not converge");
        prop_assert!(terminal.is_some(), "campaign never reached a terminal outcome");

        // With quit_on_failure disabled, termination implies every vertex is final.
        for vertex in s.graph().vertices() {
            prop_assert!(
                vertex.state().is_final(),
                "vertex {} ended in non-final state {}",
                vertex.id(),
                vertex.state()
            );
        }

        // A second terminal outcome must not appear, even if more completions
        // somehow arrive.
        let maybe_id = s
            .graph()
            .vertex_ids()
            .next()
            .map(str::to_string);
        if let Some(id) = maybe_id {
            let late = s.on_task_success(&id, json!(2)).unwrap();
            prop_assert!(late.outcome.is_none());
        }
    }
}
