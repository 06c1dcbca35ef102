//! Sequence state tests
//!
//! Deserialization of control-plane sequence states and the derived
//! per-stage display status.

use keptn_bridge::models::{SequenceState, SequenceStatus, StageStatus};

fn sequence(json: serde_json::Value) -> SequenceState {
    serde_json::from_value(json).unwrap()
}

#[test]
fn test_finished_sequence() {
    let state = sequence(serde_json::json!({
        "shkeptncontext": "ctx-1",
        "name": "delivery",
        "project": "sockshop",
        "service": "carts",
        "state": "finished",
        "time": "2021-03-04T10:00:00Z",
        "stages": [
            {
                "name": "dev",
                "state": "finished",
                "image": "docker.io/keptnexamples/carts:0.12.1",
                "latestEvaluation": {"result": "pass", "score": 100},
                "latestEvent": {"type": "sh.keptn.event.dev.delivery.finished", "id": "e1", "time": "2021-03-04T10:00:00Z"}
            },
            {
                "name": "staging",
                "state": "finished",
                "latestEvaluation": {"result": "warning", "score": 75}
            }
        ]
    }));

    assert!(state.is_finished());
    assert!(!state.is_running());
    assert!(!state.is_faulty());
    assert_eq!(state.stage_names(), vec!["dev", "staging"]);
    assert_eq!(state.stage_status("dev"), Some(StageStatus::Succeeded));
    assert_eq!(state.stage_status("staging"), Some(StageStatus::Warning));
    assert_eq!(state.stage_status("production"), None);
    assert_eq!(state.status_label(), "succeeded");
}

#[test]
fn test_failed_stage_marks_sequence_faulty() {
    let state = sequence(serde_json::json!({
        "shkeptncontext": "ctx-2",
        "name": "delivery",
        "service": "carts",
        "state": "finished",
        "stages": [
            {"name": "dev", "state": "finished"},
            {
                "name": "staging",
                "state": "finished",
                "latestFailedEvent": {"type": "sh.keptn.event.staging.delivery.finished", "id": "e9"}
            },
            {"name": "production", "state": "finished"}
        ]
    }));

    assert!(state.is_faulty());
    assert_eq!(state.stage_status("staging"), Some(StageStatus::Failed));
    assert_eq!(state.status_label(), "failed in staging");
}

#[test]
fn test_running_and_paused() {
    let running = sequence(serde_json::json!({
        "shkeptncontext": "ctx-3",
        "name": "delivery",
        "state": "started",
        "stages": [{"name": "dev", "state": "finished"}, {"name": "staging", "state": "triggered"}]
    }));
    assert!(running.is_running());
    assert_eq!(running.stage_status("staging"), Some(StageStatus::Running));
    assert_eq!(running.status_label(), "running in staging");

    let paused = sequence(serde_json::json!({
        "shkeptncontext": "ctx-4",
        "name": "delivery",
        "state": "paused"
    }));
    assert!(paused.is_paused());
    assert!(!paused.is_running());
    assert_eq!(paused.status_label(), "paused");
}

#[test]
fn test_timed_out_sequence() {
    let state = sequence(serde_json::json!({
        "shkeptncontext": "ctx-5",
        "name": "remediation",
        "state": "timedOut",
        "problemTitle": "Response time degradation",
        "stages": [{"name": "production", "state": "timedOut"}]
    }));
    assert_eq!(state.state, SequenceStatus::TimedOut);
    assert!(state.is_faulty());
    assert_eq!(state.problem_title.as_deref(), Some("Response time degradation"));
    assert_eq!(state.status_label(), "failed in production");
}

#[test]
fn test_unknown_state_is_tolerated() {
    let state = sequence(serde_json::json!({
        "shkeptncontext": "ctx-6",
        "name": "delivery",
        "state": "somethingNew"
    }));
    assert_eq!(state.state, SequenceStatus::Unknown);
    assert_eq!(state.status_label(), "unknown");
    assert!(state.last_stage().is_none());
}
