//! Sequence state models
//!
//! A sequence is the set of events sharing one `shkeptncontext` as it moves
//! through the stages of a project. The control plane reports it already
//! aggregated per stage; stage order is the pipeline order returned by the
//! backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::trace::{RESULT_FAIL, RESULT_WARNING};

/// State of a sequence or of one of its stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SequenceStatus {
    Triggered,
    Started,
    Finished,
    Paused,
    TimedOut,
    Aborted,
    Succeeded,
    Waiting,
    #[default]
    Unknown,
}

impl SequenceStatus {
    /// Wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            SequenceStatus::Triggered => "triggered",
            SequenceStatus::Started => "started",
            SequenceStatus::Finished => "finished",
            SequenceStatus::Paused => "paused",
            SequenceStatus::TimedOut => "timedOut",
            SequenceStatus::Aborted => "aborted",
            SequenceStatus::Succeeded => "succeeded",
            SequenceStatus::Waiting => "waiting",
            SequenceStatus::Unknown => "unknown",
        }
    }

    /// Parse a wire value; anything unrecognized maps to `Unknown`
    pub fn parse(s: &str) -> Self {
        match s {
            "triggered" => SequenceStatus::Triggered,
            "started" => SequenceStatus::Started,
            "finished" => SequenceStatus::Finished,
            "paused" => SequenceStatus::Paused,
            "timedOut" => SequenceStatus::TimedOut,
            "aborted" => SequenceStatus::Aborted,
            "succeeded" => SequenceStatus::Succeeded,
            "waiting" => SequenceStatus::Waiting,
            _ => SequenceStatus::Unknown,
        }
    }

    /// True while work is still in flight
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            SequenceStatus::Triggered | SequenceStatus::Started | SequenceStatus::Waiting
        )
    }
}

impl fmt::Display for SequenceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<String> for SequenceStatus {
    fn from(s: String) -> Self {
        SequenceStatus::parse(&s)
    }
}

impl From<SequenceStatus> for String {
    fn from(status: SequenceStatus) -> Self {
        status.as_str().to_string()
    }
}

/// Display status of a single stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    Succeeded,
    Warning,
    Failed,
    Running,
    Waiting,
    Paused,
    Aborted,
    Unknown,
}

impl StageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageStatus::Succeeded => "succeeded",
            StageStatus::Warning => "warning",
            StageStatus::Failed => "failed",
            StageStatus::Running => "running",
            StageStatus::Waiting => "waiting",
            StageStatus::Paused => "paused",
            StageStatus::Aborted => "aborted",
            StageStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Latest evaluation outcome in a stage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageEvaluation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// Reference to an event that happened in a stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,
}

/// One stage of a sequence
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceStage {
    pub name: String,
    #[serde(default)]
    pub state: SequenceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_evaluation: Option<StageEvaluation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_event: Option<StageEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_failed_event: Option<StageEvent>,
}

impl SequenceStage {
    /// Derive the display status of this stage
    ///
    /// Failures (a failed event or a failing evaluation) win over the stage
    /// state, then evaluation warnings, then the plain state.
    pub fn status(&self) -> StageStatus {
        let evaluation_result = self
            .latest_evaluation
            .as_ref()
            .and_then(|e| e.result.as_deref());

        if self.latest_failed_event.is_some() || evaluation_result == Some(RESULT_FAIL) {
            return StageStatus::Failed;
        }
        if evaluation_result == Some(RESULT_WARNING) {
            return StageStatus::Warning;
        }

        match self.state {
            SequenceStatus::Finished | SequenceStatus::Succeeded => StageStatus::Succeeded,
            SequenceStatus::Triggered | SequenceStatus::Started => StageStatus::Running,
            SequenceStatus::Waiting => StageStatus::Waiting,
            SequenceStatus::Paused => StageStatus::Paused,
            SequenceStatus::TimedOut => StageStatus::Failed,
            SequenceStatus::Aborted => StageStatus::Aborted,
            SequenceStatus::Unknown => StageStatus::Unknown,
        }
    }
}

/// A deployment sequence and its per-stage progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceState {
    pub shkeptncontext: String,
    /// Sequence name from the shipyard, e.g. "delivery"
    pub name: String,
    #[serde(default)]
    pub project: String,
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub state: SequenceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub problem_title: Option<String>,
    #[serde(default)]
    pub stages: Vec<SequenceStage>,
}

impl SequenceState {
    /// The stage the sequence reached last, i.e. the last stage in backend order
    pub fn last_stage(&self) -> Option<&SequenceStage> {
        self.stages.last()
    }

    pub fn stage(&self, name: &str) -> Option<&SequenceStage> {
        self.stages.iter().find(|stage| stage.name == name)
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|stage| stage.name.as_str()).collect()
    }

    /// Display status of the named stage, `None` if the sequence never reached it
    pub fn stage_status(&self, name: &str) -> Option<StageStatus> {
        self.stage(name).map(SequenceStage::status)
    }

    pub fn is_finished(&self) -> bool {
        matches!(
            self.state,
            SequenceStatus::Finished | SequenceStatus::Succeeded
        )
    }

    pub fn is_paused(&self) -> bool {
        self.state == SequenceStatus::Paused
    }

    pub fn is_running(&self) -> bool {
        self.state.is_active()
    }

    /// True if the sequence timed out or any stage failed
    pub fn is_faulty(&self) -> bool {
        self.state == SequenceStatus::TimedOut
            || self
                .stages
                .iter()
                .any(|stage| stage.status() == StageStatus::Failed)
    }

    /// Human label for the sequence, taking stage outcomes into account
    pub fn status_label(&self) -> String {
        if self.is_faulty() {
            let stage = self
                .stages
                .iter()
                .find(|stage| stage.status() == StageStatus::Failed)
                .or(self.last_stage());
            return match stage {
                Some(stage) => format!("failed in {}", stage.name),
                None => "failed".to_string(),
            };
        }
        match self.state {
            SequenceStatus::Finished | SequenceStatus::Succeeded => "succeeded".to_string(),
            SequenceStatus::Triggered | SequenceStatus::Started => match self.last_stage() {
                Some(stage) => format!("running in {}", stage.name),
                None => "started".to_string(),
            },
            SequenceStatus::Waiting => "waiting".to_string(),
            SequenceStatus::Paused => "paused".to_string(),
            SequenceStatus::Aborted => "aborted".to_string(),
            SequenceStatus::TimedOut => "timed out".to_string(),
            SequenceStatus::Unknown => "unknown".to_string(),
        }
    }
}
