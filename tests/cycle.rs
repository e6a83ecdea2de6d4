use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use dagrun::errors::DagrunError;
use dagrun::sched::{Scheduler, SchedulerConfig};
use dagrun::task::ResultsMap;
use dagrun::Orchestrator;
use dagrun_test_utils::{ExecutionLog, StubTask};

#[test]
fn start_refuses_a_cyclic_graph() {
    let mut s = Scheduler::new(SchedulerConfig::default());
    s.add_vertex("a").unwrap();
    s.add_vertex("b").unwrap();
    s.add_edge("a", "b").unwrap();
    s.add_edge("b", "a").unwrap();

    let err = s.start().unwrap_err();
    assert!(matches!(err, DagrunError::CyclicGraph));
    assert!(!s.is_running());
    assert_eq!(s.in_flight(), 0);

    // The refusal leaves the graph untouched.
    assert_eq!(s.graph().edge_count(), 2);
    assert!(s.graph().topological_sort().is_empty());
}

#[tokio::test]
async fn cyclic_campaign_starts_no_task_and_fires_no_callback() {
    let executed: ExecutionLog = Arc::new(Mutex::new(Vec::new()));
    let mut orchestrator = Orchestrator::new(SchedulerConfig::default());
    orchestrator
        .add_task("a", StubTask::succeeding(&executed))
        .unwrap();
    orchestrator
        .add_task("b", StubTask::succeeding(&executed))
        .unwrap();
    orchestrator.add_dependency("a", "b").unwrap();
    orchestrator.add_dependency("b", "a").unwrap();

    let callbacks = Arc::new(AtomicUsize::new(0));
    {
        let callbacks = Arc::clone(&callbacks);
        orchestrator.on_terminal(move |_, _| {
            callbacks.fetch_add(1, Ordering::SeqCst);
        });
    }

    let err = orchestrator.run(ResultsMap::new()).await.unwrap_err();
    assert!(matches!(err, DagrunError::CyclicGraph));
    assert!(executed.lock().unwrap().is_empty());
    assert_eq!(callbacks.load(Ordering::SeqCst), 0);
}
