//! Root store actions
//!
//! Every state change goes through one of these. Actions dispatched by
//! callers trigger effects; effects answer with result actions.

use crate::models::{KeptnInfo, Metadata, Project, SequenceState};

/// Which effect produced an unhandled failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EffectKind {
    Projects,
    LatestSequences {
        project_name: String,
        generation: u64,
    },
}

#[derive(Debug, Clone)]
pub enum RootAction {
    /// Initial load or explicit refresh of everything
    LoadRootState,
    KeptnInfoLoaded(KeptnInfo),
    KeptnInfoErrored(String),
    MetadataLoaded(Metadata),
    MetadataErrored(String),
    /// Reload projects with the current page size
    RefreshProjects,
    /// Change the page size and reload projects
    SetPageSize(u32),
    ProjectsLoaded(Vec<Project>),
    /// Latest sequences of one project; emitted once per project as each arrives
    ///
    /// `generation` is the sequences generation of the `ProjectsLoaded` that
    /// requested the fetch.
    LatestSequencesLoaded {
        project_name: String,
        sequences: Vec<SequenceState>,
        generation: u64,
    },
    /// A failure that is not part of the loading states
    EffectFailed { effect: EffectKind, message: String },
}

impl RootAction {
    /// Short name used in log lines
    pub fn name(&self) -> &'static str {
        match self {
            RootAction::LoadRootState => "LoadRootState",
            RootAction::KeptnInfoLoaded(_) => "KeptnInfoLoaded",
            RootAction::KeptnInfoErrored(_) => "KeptnInfoErrored",
            RootAction::MetadataLoaded(_) => "MetadataLoaded",
            RootAction::MetadataErrored(_) => "MetadataErrored",
            RootAction::RefreshProjects => "RefreshProjects",
            RootAction::SetPageSize(_) => "SetPageSize",
            RootAction::ProjectsLoaded(_) => "ProjectsLoaded",
            RootAction::LatestSequencesLoaded { .. } => "LatestSequencesLoaded",
            RootAction::EffectFailed { .. } => "EffectFailed",
        }
    }
}
