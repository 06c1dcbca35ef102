//! Root store effects
//!
//! Effects react to actions by calling the API on spawned tokio tasks and
//! answer with result actions over an unbounded channel:
//!
//! - `LoadRootState` -> keptn info (+ best-effort available versions) and
//!   metadata, concurrently
//! - `KeptnInfoLoaded`, `RefreshProjects`, `SetPageSize` -> projects, sized by
//!   the effective page size
//! - `ProjectsLoaded` -> latest sequences, one concurrent fetch per project,
//!   each result sent as its own action in arrival order and tagged with the
//!   sequences generation; a newer `ProjectsLoaded` aborts the previous fetch

use futures::stream::FuturesUnordered;
use futures::{Stream, StreamExt, future};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::actions::{EffectKind, RootAction};
use super::state::{LatestSequences, RootState};
use crate::api::{ApiError, ApiService};
use crate::config::Config;
use crate::constants::{DEFAULT_PAGE_SIZE, LATEST_SEQUENCES_LIMIT};
use crate::models::{KeptnInfo, SequenceState};

/// Tunables for the effects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectSettings {
    /// Page size used while neither the state nor the bridge sets one
    pub default_page_size: u32,
    /// Sequences fetched per project
    pub sequence_limit: u32,
    /// Allow the available-versions fetch when the bridge enables it
    pub enable_version_check: bool,
}

impl Default for EffectSettings {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            sequence_limit: LATEST_SEQUENCES_LIMIT,
            enable_version_check: true,
        }
    }
}

impl From<&Config> for EffectSettings {
    fn from(config: &Config) -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            sequence_limit: config.sequence_limit,
            enable_version_check: config.enable_version_check,
        }
    }
}

/// Runs the side effects of root store actions
pub struct RootEffects {
    api: Arc<dyn ApiService>,
    settings: EffectSettings,
    action_tx: mpsc::UnboundedSender<RootAction>,
    handles: Vec<JoinHandle<()>>,
    sequences_handle: Option<JoinHandle<()>>,
}

impl RootEffects {
    /// Create the effects and the channel their result actions arrive on
    pub fn new(
        api: Arc<dyn ApiService>,
        settings: EffectSettings,
    ) -> (Self, mpsc::UnboundedReceiver<RootAction>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                api,
                settings,
                action_tx: tx,
                handles: Vec::new(),
                sequences_handle: None,
            },
            rx,
        )
    }

    pub fn settings(&self) -> &EffectSettings {
        &self.settings
    }

    /// React to an action that has already been applied to `state`
    pub fn handle(&mut self, action: &RootAction, state: &RootState) {
        match action {
            RootAction::LoadRootState => {
                self.spawn_load_keptn_info();
                self.spawn_load_metadata();
            }
            // Projects do not depend on the info payload, so a failed info
            // fetch must not leave them loading forever
            RootAction::KeptnInfoLoaded(_)
            | RootAction::KeptnInfoErrored(_)
            | RootAction::RefreshProjects
            | RootAction::SetPageSize(_) => {
                let page_size = state.effective_page_size(self.settings.default_page_size);
                self.spawn_load_projects(page_size);
            }
            RootAction::ProjectsLoaded(projects) => {
                let names = projects.iter().map(|p| p.project_name.clone()).collect();
                self.spawn_load_latest_sequences(names, state.sequences_generation);
            }
            RootAction::MetadataLoaded(_)
            | RootAction::MetadataErrored(_)
            | RootAction::LatestSequencesLoaded { .. }
            | RootAction::EffectFailed { .. } => {}
        }
    }

    fn spawn<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.handles.retain(|handle| !handle.is_finished());
        self.handles.push(tokio::spawn(task));
    }

    fn spawn_load_keptn_info(&mut self) {
        let api = Arc::clone(&self.api);
        let tx = self.action_tx.clone();
        let enable_version_check = self.settings.enable_version_check;

        self.spawn(async move {
            let action = match load_keptn_info(api.as_ref(), enable_version_check).await {
                Ok(info) => RootAction::KeptnInfoLoaded(info),
                Err(e) => {
                    tracing::warn!("Failed to load keptn info: {}", e);
                    RootAction::KeptnInfoErrored(e.to_string())
                }
            };
            let _ = tx.send(action);
        });
    }

    fn spawn_load_metadata(&mut self) {
        let api = Arc::clone(&self.api);
        let tx = self.action_tx.clone();

        self.spawn(async move {
            let action = match api.get_metadata().await {
                Ok(metadata) => RootAction::MetadataLoaded(metadata),
                Err(e) => {
                    tracing::warn!("Failed to load metadata: {}", e);
                    RootAction::MetadataErrored(e.to_string())
                }
            };
            let _ = tx.send(action);
        });
    }

    fn spawn_load_projects(&mut self, page_size: u32) {
        let api = Arc::clone(&self.api);
        let tx = self.action_tx.clone();

        self.spawn(async move {
            tracing::debug!("Loading projects (pageSize={})", page_size);
            let action = match api.get_projects(page_size).await {
                Ok(projects) => RootAction::ProjectsLoaded(projects),
                Err(e) => {
                    tracing::error!("Failed to load projects: {}", e);
                    RootAction::EffectFailed {
                        effect: EffectKind::Projects,
                        message: format!("Failed to load projects: {}", e),
                    }
                }
            };
            let _ = tx.send(action);
        });
    }

    fn spawn_load_latest_sequences(&mut self, project_names: Vec<String>, generation: u64) {
        let api = Arc::clone(&self.api);
        let tx = self.action_tx.clone();
        let limit = self.settings.sequence_limit;

        if let Some(previous) = self.sequences_handle.take() {
            previous.abort();
        }
        self.sequences_handle = Some(tokio::spawn(async move {
            tracing::debug!(
                "Loading latest {} sequences for {} projects (generation {})",
                limit,
                project_names.len(),
                generation
            );
            let mut results = Box::pin(latest_sequences_stream(api, project_names, limit));

            while let Some((project_name, result)) = results.next().await {
                let action = match result {
                    Ok(sequences) => RootAction::LatestSequencesLoaded {
                        project_name,
                        sequences,
                        generation,
                    },
                    Err(e) => {
                        tracing::error!("Failed to load sequences of {}: {}", project_name, e);
                        RootAction::EffectFailed {
                            message: format!(
                                "Failed to load sequences of {}: {}",
                                project_name, e
                            ),
                            effect: EffectKind::LatestSequences {
                                project_name,
                                generation,
                            },
                        }
                    }
                };
                if tx.send(action).is_err() {
                    // Receiver gone, nobody is listening anymore
                    break;
                }
            }
        }));
    }

    /// Abort all in-flight effect tasks
    pub fn stop(&mut self) {
        for handle in self.handles.iter().chain(&self.sequences_handle) {
            handle.abort();
        }
        self.handles.clear();
        self.sequences_handle = None;
    }
}

impl Drop for RootEffects {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Fetch bridge info and, if enabled on both sides, the available versions
///
/// The versions fetch runs after the info fetch because it needs the
/// feature flag from the info response. Its failure is swallowed and
/// reported as `available_versions: None`.
pub async fn load_keptn_info(
    api: &dyn ApiService,
    enable_version_check: bool,
) -> Result<KeptnInfo, ApiError> {
    let bridge_info = api.get_keptn_info().await?;

    let available_versions = if enable_version_check && bridge_info.enable_version_check_feature {
        match api.get_available_versions().await {
            Ok(versions) => Some(versions),
            Err(e) => {
                tracing::debug!("Available versions not loaded: {}", e);
                None
            }
        }
    } else {
        None
    };

    Ok(KeptnInfo {
        bridge_info,
        available_versions,
    })
}

/// Fetch the latest sequences of every project concurrently
///
/// Yields one item per project as soon as its response arrives; the order
/// depends on response timing, not on `project_names` order.
pub fn latest_sequences_stream(
    api: Arc<dyn ApiService>,
    project_names: Vec<String>,
    limit: u32,
) -> impl Stream<Item = (String, Result<Vec<SequenceState>, ApiError>)> + Send {
    project_names
        .into_iter()
        .map(move |project_name| {
            let api = Arc::clone(&api);
            async move {
                let result = api.get_sequences(&project_name, limit).await;
                (project_name, result)
            }
        })
        .collect::<FuturesUnordered<_>>()
}

/// Fold per-project results into a growing map, emitting it after every item
pub fn accumulate_latest_sequences<S>(updates: S) -> impl Stream<Item = LatestSequences>
where
    S: Stream<Item = (String, Vec<SequenceState>)>,
{
    updates.scan(LatestSequences::new(), |acc, (project_name, sequences)| {
        acc.insert(project_name, sequences);
        future::ready(Some(acc.clone()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockApiService;
    use crate::models::{BridgeInfo, KeptnVersions, VersionList};

    fn bridge_info(enable_version_check_feature: bool) -> BridgeInfo {
        BridgeInfo {
            bridge_version: Some("0.8.0".to_string()),
            enable_version_check_feature,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_version_check_skipped_when_feature_disabled() {
        let mut api = MockApiService::new();
        api.expect_get_keptn_info()
            .times(1)
            .returning(|| Ok(bridge_info(false)));
        api.expect_get_available_versions().never();

        let info = load_keptn_info(&api, true).await.unwrap();
        assert!(info.available_versions.is_none());
    }

    #[tokio::test]
    async fn test_version_check_skipped_when_config_disables_it() {
        let mut api = MockApiService::new();
        api.expect_get_keptn_info()
            .times(1)
            .returning(|| Ok(bridge_info(true)));
        api.expect_get_available_versions().never();

        let info = load_keptn_info(&api, false).await.unwrap();
        assert!(info.available_versions.is_none());
    }

    #[tokio::test]
    async fn test_version_check_failure_is_swallowed() {
        let mut api = MockApiService::new();
        api.expect_get_keptn_info()
            .times(1)
            .returning(|| Ok(bridge_info(true)));
        api.expect_get_available_versions().times(1).returning(|| {
            Err(ApiError::Status {
                url: "https://get.keptn.sh/version.json".to_string(),
                status: 502,
            })
        });

        let info = load_keptn_info(&api, true).await.unwrap();
        assert_eq!(info.bridge_info.bridge_version.as_deref(), Some("0.8.0"));
        assert!(info.available_versions.is_none());
    }

    #[tokio::test]
    async fn test_version_check_combines_results() {
        let mut api = MockApiService::new();
        api.expect_get_keptn_info()
            .times(1)
            .returning(|| Ok(bridge_info(true)));
        api.expect_get_available_versions().times(1).returning(|| {
            Ok(KeptnVersions {
                bridge: VersionList {
                    stable: vec!["0.8.1".to_string()],
                    prerelease: vec![],
                },
                ..Default::default()
            })
        });

        let info = load_keptn_info(&api, true).await.unwrap();
        assert_eq!(
            info.bridge_update_available(),
            Some(semver::Version::new(0, 8, 1))
        );
    }

    #[tokio::test]
    async fn test_base_info_failure_propagates() {
        let mut api = MockApiService::new();
        api.expect_get_keptn_info().times(1).returning(|| {
            Err(ApiError::Status {
                url: "http://localhost:3000/api/bridgeInfo".to_string(),
                status: 500,
            })
        });
        api.expect_get_available_versions().never();

        let err = load_keptn_info(&api, true).await.unwrap_err();
        assert_eq!(err.status(), Some(500));
    }

    #[tokio::test]
    async fn test_latest_sequences_stream_uses_limit() {
        let mut api = MockApiService::new();
        api.expect_get_sequences()
            .withf(|_, limit| *limit == 5)
            .times(2)
            .returning(|_, _| Ok(vec![]));

        let api: Arc<dyn ApiService> = Arc::new(api);
        let results: Vec<_> =
            latest_sequences_stream(api, vec!["a".to_string(), "b".to_string()], 5)
                .collect()
                .await;

        let mut names: Vec<String> = results.into_iter().map(|(name, _)| name).collect();
        names.sort();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_projects_use_bridge_page_size() {
        let mut api = MockApiService::new();
        api.expect_get_projects()
            .withf(|page_size| *page_size == 20)
            .times(1)
            .returning(|_| Ok(vec![]));

        let (mut effects, mut rx) = RootEffects::new(Arc::new(api), EffectSettings::default());
        let mut info = KeptnInfo::default();
        info.bridge_info.projects_page_size = Some(20);
        let action = RootAction::KeptnInfoLoaded(info);
        let mut state = RootState::new(None);
        state.reduce(&action);
        effects.handle(&action, &state);

        match rx.recv().await {
            Some(RootAction::ProjectsLoaded(projects)) => assert!(projects.is_empty()),
            other => panic!("unexpected action: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_sequences_are_tagged_with_generation() {
        let mut api = MockApiService::new();
        api.expect_get_sequences()
            .times(1)
            .returning(|_, _| Ok(vec![]));

        let (mut effects, mut rx) = RootEffects::new(Arc::new(api), EffectSettings::default());
        let action = RootAction::ProjectsLoaded(vec![crate::models::Project::new("a", vec![])]);
        let mut state = RootState::new(None);
        state.sequences_generation = 6;
        state.reduce(&action);
        effects.handle(&action, &state);

        match rx.recv().await {
            Some(RootAction::LatestSequencesLoaded {
                project_name,
                generation,
                ..
            }) => {
                assert_eq!(project_name, "a");
                assert_eq!(generation, 7);
            }
            other => panic!("unexpected action: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_projects_use_default_page_size() {
        let mut api = MockApiService::new();
        api.expect_get_projects()
            .withf(|page_size| *page_size == 50)
            .times(1)
            .returning(|_| Ok(vec![]));

        let (mut effects, mut rx) = RootEffects::new(Arc::new(api), EffectSettings::default());
        let state = RootState::new(None);
        effects.handle(&RootAction::RefreshProjects, &state);

        match rx.recv().await {
            Some(RootAction::ProjectsLoaded(projects)) => assert!(projects.is_empty()),
            other => panic!("unexpected action: {:?}", other),
        }
    }
}
