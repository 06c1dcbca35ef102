//! Pipeline event ("trace") model
//!
//! A [`Trace`] wraps one event emitted by the delivery pipeline. The payload
//! varies by event type, so every payload field is optional and only the
//! fields the classification logic reads are modeled explicitly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use super::event_types::{self, DEFAULT_ICON, PROBLEM_DETECTED, PROBLEM_RESOLVED_LABEL};

/// Result value reported by a successful task
pub const RESULT_PASS: &str = "pass";
/// Result value reported by a failed task
pub const RESULT_FAIL: &str = "fail";
/// Result value reported by a task that passed with warnings
pub const RESULT_WARNING: &str = "warning";
/// Problem state reported once a problem has been resolved
pub const PROBLEM_STATE_RESOLVED: &str = "RESOLVED";

/// A single delivery-pipeline event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trace {
    pub id: String,
    /// Groups all events of one sequence
    pub shkeptncontext: String,
    /// Name of the emitting component
    #[serde(default)]
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specversion: Option<String>,
    pub time: DateTime<Utc>,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<TraceData>,

    #[serde(skip)]
    label: OnceLock<String>,
    #[serde(skip)]
    icon: OnceLock<&'static str>,
}

/// Event payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    /// Task result: "pass", "warning", "fail", ...
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    /// Task status: "succeeded", "errored", ...
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values_canary: Option<ValuesCanary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment: Option<DeploymentData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<EvaluationData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval: Option<ApprovalData>,

    // Problem events use PascalCase payload keys
    #[serde(rename = "State", default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(rename = "ProblemID", default, skip_serializing_if = "Option::is_none")]
    pub problem_id: Option<String>,
    #[serde(
        rename = "ProblemTitle",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub problem_title: Option<String>,
}

/// Helm values of a canary deployment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValuesCanary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeploymentData {
    #[serde(
        rename = "deploymentstrategy",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub deployment_strategy: Option<String>,
}

/// Evaluation details attached to evaluation events
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_start: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_end: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub indicator_results: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApprovalData {
    /// "approved" or "declined"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl Trace {
    pub fn new(
        id: impl Into<String>,
        shkeptncontext: impl Into<String>,
        event_type: impl Into<String>,
        time: DateTime<Utc>,
        data: Option<TraceData>,
    ) -> Self {
        Self {
            id: id.into(),
            shkeptncontext: shkeptncontext.into(),
            source: String::new(),
            specversion: None,
            time,
            event_type: event_type.into(),
            data,
            label: OnceLock::new(),
            icon: OnceLock::new(),
        }
    }

    /// Human-readable label, computed once and cached
    ///
    /// Unmapped types fall back to the raw type string. A problem event whose
    /// payload reports `State: RESOLVED` is labeled as resolved.
    pub fn label(&self) -> &str {
        self.label.get_or_init(|| {
            if self.is_problem_resolved() {
                return PROBLEM_RESOLVED_LABEL.to_string();
            }
            event_types::event_label(&self.event_type)
                .map(str::to_string)
                .unwrap_or_else(|| self.event_type.clone())
        })
    }

    /// Icon key, computed once and cached
    pub fn icon(&self) -> &'static str {
        *self
            .icon
            .get_or_init(|| event_types::event_icon(&self.event_type).unwrap_or(DEFAULT_ICON))
    }

    pub fn result(&self) -> Option<&str> {
        self.data.as_ref().and_then(|d| d.result.as_deref())
    }

    pub fn project(&self) -> Option<&str> {
        self.data.as_ref().and_then(|d| d.project.as_deref())
    }

    pub fn service(&self) -> Option<&str> {
        self.data.as_ref().and_then(|d| d.service.as_deref())
    }

    pub fn stage(&self) -> Option<&str> {
        self.data.as_ref().and_then(|d| d.stage.as_deref())
    }

    /// True iff the payload result is "fail"; false when there is no payload
    pub fn is_failed(&self) -> bool {
        self.result() == Some(RESULT_FAIL)
    }

    pub fn is_warning(&self) -> bool {
        self.result() == Some(RESULT_WARNING)
    }

    /// True iff the event type mentions "problem"
    pub fn is_problem(&self) -> bool {
        self.event_type.contains("problem")
    }

    pub fn is_problem_resolved(&self) -> bool {
        self.event_type == PROBLEM_DETECTED
            && self.data.as_ref().and_then(|d| d.state.as_deref()) == Some(PROBLEM_STATE_RESOLVED)
    }

    /// Stage in which the event went wrong
    ///
    /// Returns the payload stage for failed or problem events; `None` otherwise,
    /// and also `None` when the payload carries no stage.
    pub fn is_faulty(&self) -> Option<&str> {
        let data = self.data.as_ref()?;
        if self.is_failed() || self.is_problem() {
            data.stage.as_deref()
        } else {
            None
        }
    }

    /// True iff the result is "pass" and the event is not faulty
    ///
    /// A "pass" on a problem event is not a success.
    pub fn is_successful(&self) -> bool {
        self.data.is_some() && self.result() == Some(RESULT_PASS) && self.is_faulty().is_none()
    }

    pub fn is_evaluation(&self) -> bool {
        event_types::task_name(&self.event_type) == Some("evaluation")
            || self.event_type == event_types::LEGACY_EVALUATION_DONE
            || self.event_type == event_types::START_EVALUATION
    }

    pub fn is_approval(&self) -> bool {
        event_types::task_name(&self.event_type) == Some("approval")
    }

    /// An approval that was declined, either explicitly or by a failing result
    pub fn is_declined(&self) -> bool {
        if !self.is_approval() {
            return false;
        }
        let declined = self
            .data
            .as_ref()
            .and_then(|d| d.approval.as_ref())
            .and_then(|a| a.result.as_deref())
            == Some("declined");
        declined || self.is_failed()
    }

    pub fn evaluation_score(&self) -> Option<f64> {
        self.data
            .as_ref()
            .and_then(|d| d.evaluation.as_ref())
            .and_then(|e| e.score)
    }

    /// Last path segment of the deployed image (`repo/name:tag` -> `name:tag`)
    ///
    /// Reads `data.image`, falling back to `data.valuesCanary.image`. Empty
    /// strings count as absent.
    pub fn short_image_name(&self) -> Option<&str> {
        let data = self.data.as_ref()?;
        let image = data
            .image
            .as_deref()
            .filter(|image| !image.is_empty())
            .or_else(|| {
                data.values_canary
                    .as_ref()
                    .and_then(|canary| canary.image.as_deref())
                    .filter(|image| !image.is_empty())
            })?;
        image.rsplit('/').next()
    }
}

/// Group traces by `shkeptncontext`
///
/// Groups keep the order in which their context was first seen; traces inside
/// a group are sorted by time (stable for equal timestamps).
pub fn group_by_context(traces: Vec<Trace>) -> Vec<(String, Vec<Trace>)> {
    let mut groups: Vec<(String, Vec<Trace>)> = Vec::new();
    for trace in traces {
        match groups
            .iter_mut()
            .find(|(context, _)| *context == trace.shkeptncontext)
        {
            Some((_, group)) => group.push(trace),
            None => groups.push((trace.shkeptncontext.clone(), vec![trace])),
        }
    }
    for (_, group) in &mut groups {
        group.sort_by_key(|trace| trace.time);
    }
    groups
}
