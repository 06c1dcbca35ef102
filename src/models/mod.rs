//! Bridge model layer
//!
//! Rust types for the JSON documents served by the control plane.
//!
//! Structure:
//! - `event_types.rs` - Event type constants and label/icon lookup tables
//! - `trace.rs` - Single pipeline events and their classification
//! - `sequence.rs` - Aggregated per-stage sequence state
//! - `project.rs` - Projects, stages and services
//! - `keptn_info.rs` - Bridge info, available versions and metadata

pub mod event_types;
pub mod keptn_info;
pub mod project;
pub mod sequence;
pub mod trace;

pub use keptn_info::{BridgeInfo, KeptnInfo, KeptnVersions, Metadata, VersionList};
pub use project::{Project, ProjectsPage, Service, Stage, shipyard_version_not_supported};
pub use sequence::{
    SequenceStage, SequenceState, SequenceStatus, StageEvaluation, StageEvent, StageStatus,
};
pub use trace::{Trace, TraceData, group_by_context};
