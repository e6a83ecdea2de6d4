use serde_json::json;

use dagrun::dag::VertexState;
use dagrun::sched::{CampaignOutcome, Scheduler, SchedulerConfig};

fn roots_scheduler(max_concurrent: usize) -> Scheduler {
    let mut s = Scheduler::new(SchedulerConfig {
        name: "roots".to_string(),
        max_concurrent,
        quit_on_failure: false,
    });
    for id in ["a", "b", "c"] {
        s.add_vertex(id).unwrap();
    }
    s
}

#[test]
fn unbounded_cap_runs_all_roots_at_once() {
    let mut s = roots_scheduler(0);
    let step = s.start().unwrap();
    assert_eq!(step.started.len(), 3);
    assert_eq!(s.in_flight(), 3);
    for id in ["a", "b", "c"] {
        assert_eq!(s.state_of(id), Some(VertexState::InProgress));
    }

    for id in ["a", "b", "c"] {
        let step = s.on_task_success(id, json!(null)).unwrap();
        if id == "c" {
            assert!(matches!(step.outcome, Some(CampaignOutcome::Success)));
        } else {
            assert!(step.outcome.is_none());
        }
    }
    assert_eq!(s.in_flight(), 0);
}

#[test]
fn cap_defers_ready_vertices_until_a_slot_frees() {
    let mut s = roots_scheduler(2);

    let step = s.start().unwrap();
    assert_eq!(step.started.len(), 2);
    assert_eq!(s.in_flight(), 2);

    // One root is still waiting its turn.
    let waiting: Vec<&str> = ["a", "b", "c"]
        .into_iter()
        .filter(|id| s.state_of(id) == Some(VertexState::Ready))
        .collect();
    assert_eq!(waiting.len(), 1);

    // Completing one running root admits the deferred one.
    let running = step.started[0].clone();
    let step = s.on_task_success(&running, json!(null)).unwrap();
    assert_eq!(step.started.len(), 1);
    assert_eq!(s.in_flight(), 2);
}

#[test]
fn cap_is_never_exceeded_through_a_whole_campaign() {
    let mut s = Scheduler::new(SchedulerConfig {
        name: "capped".to_string(),
        max_concurrent: 1,
        quit_on_failure: false,
    });
    for id in ["a", "b", "c", "d"] {
        s.add_vertex(id).unwrap();
    }
    s.add_edge("a", "c").unwrap();
    s.add_edge("b", "d").unwrap();

    let mut executing: Vec<String> = s.start().unwrap().started;
    let mut finished = false;
    while let Some(id) = executing.pop() {
        assert!(s.in_flight() <= 1, "cap exceeded");
        let step = s.on_task_success(&id, json!(null)).unwrap();
        executing.extend(step.started);
        finished = step.outcome.is_some();
    }
    assert!(finished);
}
