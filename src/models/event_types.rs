//! Keptn event type definitions
//!
//! Centralizes the event type strings emitted by the delivery pipeline and the
//! static label/icon lookup tables used to present them. Both the legacy
//! (`sh.keptn.events.*`) and the task-based (`sh.keptn.event.<task>.<phase>`)
//! naming schemes are covered.

/// Icon used for any event type without a dedicated icon
pub const DEFAULT_ICON: &str = "information";

/// Label shown for a problem event whose payload reports `State: RESOLVED`
pub const PROBLEM_RESOLVED_LABEL: &str = "Problem resolved";

/// Prefix shared by all task-based event types
pub const EVENT_TYPE_PREFIX: &str = "sh.keptn.event.";

// Configuration and service lifecycle
pub const CONFIGURATION_CHANGE: &str = "sh.keptn.event.configuration.change";
pub const SERVICE_CREATE: &str = "sh.keptn.internal.event.service.create";

// Deployment
pub const DEPLOYMENT_TRIGGERED: &str = "sh.keptn.event.deployment.triggered";
pub const DEPLOYMENT_STARTED: &str = "sh.keptn.event.deployment.started";
pub const DEPLOYMENT_FINISHED: &str = "sh.keptn.event.deployment.finished";
pub const LEGACY_DEPLOYMENT_FINISHED: &str = "sh.keptn.events.deployment-finished";

// Tests
pub const TEST_TRIGGERED: &str = "sh.keptn.event.test.triggered";
pub const TEST_STARTED: &str = "sh.keptn.event.test.started";
pub const TEST_FINISHED: &str = "sh.keptn.event.test.finished";
pub const LEGACY_TESTS_FINISHED: &str = "sh.keptn.events.tests-finished";

// Evaluation
pub const START_EVALUATION: &str = "sh.keptn.event.start-evaluation";
pub const EVALUATION_TRIGGERED: &str = "sh.keptn.event.evaluation.triggered";
pub const EVALUATION_STARTED: &str = "sh.keptn.event.evaluation.started";
pub const EVALUATION_FINISHED: &str = "sh.keptn.event.evaluation.finished";
pub const LEGACY_EVALUATION_DONE: &str = "sh.keptn.events.evaluation-done";

// SLI retrieval
pub const GET_SLI: &str = "sh.keptn.internal.event.get-sli";
pub const GET_SLI_DONE: &str = "sh.keptn.internal.event.get-sli.done";
pub const GET_SLI_TRIGGERED: &str = "sh.keptn.event.get-sli.triggered";
pub const GET_SLI_FINISHED: &str = "sh.keptn.event.get-sli.finished";

// Release
pub const RELEASE_TRIGGERED: &str = "sh.keptn.event.release.triggered";
pub const RELEASE_STARTED: &str = "sh.keptn.event.release.started";
pub const RELEASE_FINISHED: &str = "sh.keptn.event.release.finished";

// Approval
pub const APPROVAL_TRIGGERED: &str = "sh.keptn.event.approval.triggered";
pub const APPROVAL_STARTED: &str = "sh.keptn.event.approval.started";
pub const APPROVAL_FINISHED: &str = "sh.keptn.event.approval.finished";

// Problems and remediation
pub const PROBLEM_DETECTED: &str = "sh.keptn.events.problem";
pub const PROBLEM_OPEN: &str = "sh.keptn.event.problem.open";
pub const PROBLEM_CLOSE: &str = "sh.keptn.event.problem.close";
pub const REMEDIATION_TRIGGERED: &str = "sh.keptn.event.remediation.triggered";
pub const REMEDIATION_FINISHED: &str = "sh.keptn.event.remediation.finished";
pub const ACTION_TRIGGERED: &str = "sh.keptn.event.action.triggered";
pub const ACTION_STARTED: &str = "sh.keptn.event.action.started";
pub const ACTION_FINISHED: &str = "sh.keptn.event.action.finished";

pub const LEGACY_DONE: &str = "sh.keptn.events.done";

/// Look up the human-readable label for an event type
///
/// Returns `None` for unmapped types; callers fall back to the raw type string.
pub fn event_label(event_type: &str) -> Option<&'static str> {
    let label = match event_type {
        CONFIGURATION_CHANGE => "Configuration change",
        SERVICE_CREATE => "Service create",
        DEPLOYMENT_TRIGGERED => "Deployment triggered",
        DEPLOYMENT_STARTED => "Deployment started",
        DEPLOYMENT_FINISHED | LEGACY_DEPLOYMENT_FINISHED => "Deployment finished",
        TEST_TRIGGERED => "Tests triggered",
        TEST_STARTED => "Tests started",
        TEST_FINISHED | LEGACY_TESTS_FINISHED => "Tests finished",
        START_EVALUATION => "Start evaluation",
        EVALUATION_TRIGGERED => "Evaluation triggered",
        EVALUATION_STARTED => "Evaluation started",
        EVALUATION_FINISHED => "Evaluation finished",
        LEGACY_EVALUATION_DONE => "Evaluation done",
        GET_SLI | GET_SLI_TRIGGERED => "Start SLI retrieval",
        GET_SLI_DONE | GET_SLI_FINISHED => "SLI retrieval done",
        RELEASE_TRIGGERED => "Release triggered",
        RELEASE_STARTED => "Release started",
        RELEASE_FINISHED => "Release finished",
        APPROVAL_TRIGGERED => "Approval triggered",
        APPROVAL_STARTED => "Approval started",
        APPROVAL_FINISHED => "Approval finished",
        PROBLEM_DETECTED => "Problem detected",
        PROBLEM_OPEN => "Problem open",
        PROBLEM_CLOSE => "Problem closed",
        REMEDIATION_TRIGGERED => "Remediation triggered",
        REMEDIATION_FINISHED => "Remediation finished",
        ACTION_TRIGGERED => "Remediation action triggered",
        ACTION_STARTED => "Remediation action started",
        ACTION_FINISHED => "Remediation action finished",
        LEGACY_DONE => "Done",
        _ => return None,
    };
    Some(label)
}

/// Look up the icon key for an event type
///
/// Returns `None` for unmapped types; callers fall back to [`DEFAULT_ICON`].
pub fn event_icon(event_type: &str) -> Option<&'static str> {
    let icon = match event_type {
        CONFIGURATION_CHANGE => "duplicate",
        DEPLOYMENT_TRIGGERED
        | DEPLOYMENT_STARTED
        | DEPLOYMENT_FINISHED
        | LEGACY_DEPLOYMENT_FINISHED => "deploy",
        TEST_TRIGGERED | TEST_STARTED | TEST_FINISHED | LEGACY_TESTS_FINISHED => {
            "performance-health"
        }
        START_EVALUATION
        | EVALUATION_TRIGGERED
        | EVALUATION_STARTED
        | EVALUATION_FINISHED
        | LEGACY_EVALUATION_DONE => "traffic-light",
        GET_SLI | GET_SLI_DONE | GET_SLI_TRIGGERED | GET_SLI_FINISHED => "collector",
        RELEASE_TRIGGERED | RELEASE_STARTED | RELEASE_FINISHED => "release",
        APPROVAL_TRIGGERED | APPROVAL_STARTED | APPROVAL_FINISHED => "approval",
        PROBLEM_DETECTED | PROBLEM_OPEN => "criticalevent",
        PROBLEM_CLOSE => "applicationhealth",
        REMEDIATION_TRIGGERED | REMEDIATION_FINISHED | ACTION_TRIGGERED | ACTION_STARTED
        | ACTION_FINISHED => "heal",
        _ => return None,
    };
    Some(icon)
}

/// Task name of a task-based event type (`sh.keptn.event.<task>.<phase>`)
///
/// Legacy event types and types outside the `sh.keptn.event.` namespace yield `None`.
pub fn task_name(event_type: &str) -> Option<&str> {
    let rest = event_type.strip_prefix(EVENT_TYPE_PREFIX)?;
    let (task, _phase) = rest.rsplit_once('.')?;
    Some(task)
}
