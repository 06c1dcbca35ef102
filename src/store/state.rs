//! Root state and reducer
//!
//! [`RootState`] is changed only by [`RootState::reduce`]. [`RootStore`]
//! shares one state between the session and its readers; readers receive
//! cloned snapshots.

use std::sync::{Arc, PoisonError, RwLock};

use super::actions::{EffectKind, RootAction};
use super::api_call::ApiCall;
use crate::models::{KeptnInfo, Metadata, Project, SequenceState};

/// Latest sequences per project, in arrival order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LatestSequences {
    entries: Vec<(String, Vec<SequenceState>)>,
}

impl LatestSequences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the sequences of a project
    ///
    /// New projects are appended; replacing keeps the original position.
    pub fn insert(&mut self, project_name: String, sequences: Vec<SequenceState>) {
        match self
            .entries
            .iter_mut()
            .find(|(name, _)| *name == project_name)
        {
            Some((_, existing)) => *existing = sequences,
            None => self.entries.push((project_name, sequences)),
        }
    }

    pub fn get(&self, project_name: &str) -> Option<&[SequenceState]> {
        self.entries
            .iter()
            .find(|(name, _)| name == project_name)
            .map(|(_, sequences)| sequences.as_slice())
    }

    pub fn contains(&self, project_name: &str) -> bool {
        self.get(project_name).is_some()
    }

    /// Project names in arrival order
    pub fn project_names(&self) -> Vec<&str> {
        self.entries.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[SequenceState])> {
        self.entries
            .iter()
            .map(|(name, sequences)| (name.as_str(), sequences.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop projects for which `keep` returns false
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.entries.retain(|(name, _)| keep(name));
    }
}

/// Application-wide state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RootState {
    pub keptn_info: ApiCall<KeptnInfo>,
    pub metadata: ApiCall<Metadata>,
    pub projects: ApiCall<Vec<Project>>,
    pub latest_sequences: LatestSequences,
    /// Projects whose latest sequences were requested but have not arrived
    pub pending_sequences: Vec<String>,
    /// Bumped by every `ProjectsLoaded`; sequence results of older
    /// generations are dropped
    pub sequences_generation: u64,
    /// Project page size; `None` means the default
    pub page_size: Option<u32>,
    /// Last failure that no loading state covers
    pub last_error: Option<String>,
}

impl RootState {
    pub fn new(page_size: Option<u32>) -> Self {
        Self {
            page_size,
            ..Default::default()
        }
    }

    /// False for sequence results requested before the latest project list
    pub fn accepts(&self, action: &RootAction) -> bool {
        match action {
            RootAction::LatestSequencesLoaded { generation, .. }
            | RootAction::EffectFailed {
                effect: EffectKind::LatestSequences { generation, .. },
                ..
            } => *generation == self.sequences_generation,
            _ => true,
        }
    }

    /// Apply an action
    pub fn reduce(&mut self, action: &RootAction) {
        if !self.accepts(action) {
            tracing::debug!(
                "Dropping stale {} (current generation {})",
                action.name(),
                self.sequences_generation
            );
            return;
        }
        match action {
            RootAction::LoadRootState => {
                self.keptn_info.start_loading();
                self.metadata.start_loading();
                self.projects.start_loading();
                self.last_error = None;
            }
            RootAction::KeptnInfoLoaded(info) => {
                self.keptn_info.set_loaded(info.clone());
            }
            RootAction::KeptnInfoErrored(message) => {
                self.keptn_info.set_error(message.clone());
            }
            RootAction::MetadataLoaded(metadata) => {
                self.metadata.set_loaded(metadata.clone());
            }
            RootAction::MetadataErrored(message) => {
                self.metadata.set_error(message.clone());
            }
            RootAction::RefreshProjects => {
                self.projects.start_loading();
            }
            RootAction::SetPageSize(page_size) => {
                self.page_size = Some(*page_size);
                self.projects.start_loading();
            }
            RootAction::ProjectsLoaded(projects) => {
                let names: Vec<String> = projects.iter().map(|p| p.project_name.clone()).collect();
                self.latest_sequences
                    .retain(|name| names.iter().any(|n| n == name));
                self.pending_sequences = names;
                self.sequences_generation += 1;
                self.projects.set_loaded(projects.clone());
            }
            RootAction::LatestSequencesLoaded {
                project_name,
                sequences,
                ..
            } => {
                self.pending_sequences.retain(|name| name != project_name);
                self.latest_sequences
                    .insert(project_name.clone(), sequences.clone());
            }
            RootAction::EffectFailed { effect, message } => {
                if let EffectKind::LatestSequences { project_name, .. } = effect {
                    self.pending_sequences.retain(|name| name != project_name);
                }
                self.last_error = Some(message.clone());
            }
        }
    }

    /// True once every requested call has completed
    pub fn is_settled(&self) -> bool {
        self.keptn_info.status.is_settled()
            && self.metadata.status.is_settled()
            && self.projects.status.is_settled()
            && self.pending_sequences.is_empty()
    }

    /// True while no call is in flight and no sequences are pending
    ///
    /// Unlike [`RootState::is_settled`] this also holds for calls that were
    /// never started.
    pub fn is_idle(&self) -> bool {
        !self.keptn_info.is_loading()
            && !self.metadata.is_loading()
            && !self.projects.is_loading()
            && self.pending_sequences.is_empty()
    }

    /// Page size for the next projects fetch
    ///
    /// An explicit page size wins, then the size the bridge advertises.
    pub fn effective_page_size(&self, default: u32) -> u32 {
        self.page_size
            .or_else(|| {
                self.keptn_info
                    .data
                    .as_ref()
                    .and_then(|info| info.bridge_info.projects_page_size)
                    .filter(|size| *size > 0)
            })
            .unwrap_or(default)
    }

    pub fn project_names(&self) -> Vec<&str> {
        self.projects
            .data
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|p| p.project_name.as_str())
            .collect()
    }

    pub fn project(&self, project_name: &str) -> Option<&Project> {
        self.projects
            .data
            .as_ref()?
            .iter()
            .find(|p| p.project_name == project_name)
    }
}

/// Thread-safe root state store
#[derive(Clone, Default)]
pub struct RootStore {
    inner: Arc<RwLock<RootState>>,
}

impl RootStore {
    pub fn new(initial: RootState) -> Self {
        Self {
            inner: Arc::new(RwLock::new(initial)),
        }
    }

    /// Apply an action to the shared state
    pub fn dispatch(&self, action: &RootAction) {
        let mut state = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        state.reduce(action);
    }

    /// Get a copy of the current state
    pub fn snapshot(&self) -> RootState {
        self.read(RootState::clone)
    }

    /// Run a selector against the current state
    pub fn read<R>(&self, selector: impl FnOnce(&RootState) -> R) -> R {
        let state = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        selector(&state)
    }

    pub fn latest_sequences(&self) -> LatestSequences {
        self.read(|state| state.latest_sequences.clone())
    }

    pub fn projects(&self) -> ApiCall<Vec<Project>> {
        self.read(|state| state.projects.clone())
    }

    pub fn keptn_info(&self) -> ApiCall<KeptnInfo> {
        self.read(|state| state.keptn_info.clone())
    }

    pub fn metadata(&self) -> ApiCall<Metadata> {
        self.read(|state| state.metadata.clone())
    }

    pub fn page_size(&self) -> Option<u32> {
        self.read(|state| state.page_size)
    }

    pub fn is_settled(&self) -> bool {
        self.read(RootState::is_settled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Project, SequenceStatus};
    use crate::store::LoadStatus;

    fn sequence(context: &str) -> SequenceState {
        SequenceState {
            shkeptncontext: context.to_string(),
            name: "delivery".to_string(),
            project: String::new(),
            service: "carts".to_string(),
            state: SequenceStatus::Finished,
            time: None,
            problem_title: None,
            stages: vec![],
        }
    }

    #[test]
    fn test_load_root_state_sets_loading() {
        let mut state = RootState::new(None);
        state.reduce(&RootAction::LoadRootState);
        assert_eq!(state.keptn_info.status, LoadStatus::Loading);
        assert_eq!(state.metadata.status, LoadStatus::Loading);
        assert_eq!(state.projects.status, LoadStatus::Loading);
        assert!(!state.is_settled());
        assert!(!state.is_idle());
        assert!(RootState::new(None).is_idle());
    }

    #[test]
    fn test_metadata_errored_is_distinct_from_loaded() {
        let mut state = RootState::new(None);
        state.reduce(&RootAction::LoadRootState);
        state.reduce(&RootAction::MetadataErrored("503".to_string()));
        assert_eq!(state.metadata.status, LoadStatus::Error);
        assert_eq!(state.metadata.error.as_deref(), Some("503"));
        assert!(state.metadata.data.is_none());
    }

    #[test]
    fn test_set_page_size_reloads_projects() {
        let mut state = RootState::new(None);
        state.reduce(&RootAction::SetPageSize(10));
        assert_eq!(state.page_size, Some(10));
        assert!(state.projects.is_loading());
    }

    #[test]
    fn test_effective_page_size_prefers_explicit_then_bridge() {
        let mut info = KeptnInfo::default();
        info.bridge_info.projects_page_size = Some(20);

        let mut state = RootState::new(None);
        assert_eq!(state.effective_page_size(50), 50);

        state.reduce(&RootAction::KeptnInfoLoaded(info.clone()));
        assert_eq!(state.effective_page_size(50), 20);

        state.reduce(&RootAction::SetPageSize(5));
        assert_eq!(state.effective_page_size(50), 5);

        info.bridge_info.projects_page_size = Some(0);
        let mut state = RootState::new(None);
        state.reduce(&RootAction::KeptnInfoLoaded(info));
        assert_eq!(state.effective_page_size(50), 50);
    }

    #[test]
    fn test_latest_sequences_replace_keeps_position() {
        let mut sequences = LatestSequences::new();
        sequences.insert("a".to_string(), vec![sequence("1")]);
        sequences.insert("b".to_string(), vec![sequence("2")]);
        sequences.insert("a".to_string(), vec![sequence("3"), sequence("4")]);

        assert_eq!(sequences.project_names(), vec!["a", "b"]);
        assert_eq!(sequences.get("a").unwrap().len(), 2);
    }

    #[test]
    fn test_projects_loaded_tracks_pending_sequences() {
        let mut state = RootState::new(None);
        state.reduce(&RootAction::LoadRootState);
        state.reduce(&RootAction::KeptnInfoLoaded(Default::default()));
        state.reduce(&RootAction::MetadataLoaded(Default::default()));
        state.reduce(&RootAction::ProjectsLoaded(vec![
            Project::new("a", vec![]),
            Project::new("b", vec![]),
        ]));
        assert_eq!(state.pending_sequences, vec!["a", "b"]);

        state.reduce(&RootAction::LatestSequencesLoaded {
            project_name: "b".to_string(),
            sequences: vec![sequence("1")],
            generation: 1,
        });
        state.reduce(&RootAction::EffectFailed {
            effect: EffectKind::LatestSequences {
                project_name: "a".to_string(),
                generation: 1,
            },
            message: "timeout".to_string(),
        });

        assert!(state.is_settled());
        assert_eq!(state.latest_sequences.project_names(), vec!["b"]);
        assert_eq!(state.last_error.as_deref(), Some("timeout"));
    }

    #[test]
    fn test_stale_sequence_results_are_dropped() {
        let mut state = RootState::new(None);
        state.reduce(&RootAction::ProjectsLoaded(vec![
            Project::new("deleted", vec![]),
            Project::new("kept", vec![]),
        ]));
        state.reduce(&RootAction::ProjectsLoaded(vec![Project::new("kept", vec![])]));
        assert_eq!(state.sequences_generation, 2);

        state.reduce(&RootAction::LatestSequencesLoaded {
            project_name: "deleted".to_string(),
            sequences: vec![sequence("1")],
            generation: 1,
        });
        state.reduce(&RootAction::LatestSequencesLoaded {
            project_name: "kept".to_string(),
            sequences: vec![sequence("2")],
            generation: 1,
        });
        state.reduce(&RootAction::EffectFailed {
            effect: EffectKind::LatestSequences {
                project_name: "kept".to_string(),
                generation: 1,
            },
            message: "timeout".to_string(),
        });

        assert!(state.latest_sequences.is_empty());
        assert_eq!(state.pending_sequences, vec!["kept"]);
        assert!(state.last_error.is_none());
        assert!(!state.is_idle());

        state.reduce(&RootAction::LatestSequencesLoaded {
            project_name: "kept".to_string(),
            sequences: vec![sequence("3")],
            generation: 2,
        });
        assert_eq!(state.latest_sequences.project_names(), vec!["kept"]);
        assert!(state.is_idle());
    }

    #[test]
    fn test_store_dispatch_and_snapshot() {
        let store = RootStore::new(RootState::new(Some(25)));
        store.dispatch(&RootAction::LoadRootState);
        let snapshot = store.snapshot();
        assert_eq!(snapshot.page_size, Some(25));
        assert!(store.projects().is_loading());
    }
}
