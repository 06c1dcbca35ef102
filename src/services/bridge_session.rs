//! Headless bridge session for library consumers
//!
//! `BridgeSession` wraps an API service, the root store and its effects into
//! a single abstraction. Actions dispatched on the session are reduced into
//! the store first and then handed to the effects; result actions come back
//! over a channel and are processed the same way.

use anyhow::{Context, Result, bail};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::api::{ApiService, HttpApiService};
use crate::config::Config;
use crate::store::{EffectSettings, RootAction, RootEffects, RootState, RootStore};

/// A headless session against one bridge API.
///
/// # Example
///
/// ```rust,no_run
/// use keptn_bridge::config::Config;
/// use keptn_bridge::services::BridgeSession;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::default();
/// let mut session = BridgeSession::from_config(&config)?;
///
/// let state = session.load().await?;
/// for (project, sequences) in state.latest_sequences.iter() {
///     println!("{}: {} sequences", project, sequences.len());
/// }
/// # Ok(())
/// # }
/// ```
pub struct BridgeSession {
    store: RootStore,
    effects: RootEffects,
    action_rx: mpsc::UnboundedReceiver<RootAction>,
}

impl BridgeSession {
    /// Create a session on top of any [`ApiService`].
    pub fn new(api: Arc<dyn ApiService>, config: &Config) -> Self {
        let store = RootStore::new(RootState::new(config.page_size));
        let (effects, action_rx) = RootEffects::new(api, EffectSettings::from(config));

        Self {
            store,
            effects,
            action_rx,
        }
    }

    /// Create a session talking HTTP to `config.api_url`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let api = HttpApiService::from_config(config)
            .with_context(|| format!("Failed to create API client for '{}'", config.api_url))?;
        Ok(Self::new(Arc::new(api), config))
    }

    /// Returns the shared store. Clones of it observe every update.
    pub fn store(&self) -> &RootStore {
        &self.store
    }

    /// Returns a copy of the current state.
    pub fn snapshot(&self) -> RootState {
        self.store.snapshot()
    }

    /// Reduce an action into the store and run its effects.
    pub fn dispatch(&mut self, action: RootAction) {
        tracing::debug!("Dispatching {}", action.name());
        self.store.dispatch(&action);

        let effects = &mut self.effects;
        self.store.read(|state| effects.handle(&action, state));
    }

    /// Load keptn info, metadata, projects and their latest sequences.
    pub fn load_root_state(&mut self) {
        self.dispatch(RootAction::LoadRootState);
    }

    /// Reload projects (and then their sequences) with the current page size.
    pub fn refresh_projects(&mut self) {
        self.dispatch(RootAction::RefreshProjects);
    }

    /// Change the project page size and reload projects.
    pub fn set_page_size(&mut self, page_size: u32) {
        self.dispatch(RootAction::SetPageSize(page_size));
    }

    /// Wait for and return the next result action without applying it.
    ///
    /// Returns `None` if the effects channel is closed.
    pub async fn recv_action(&mut self) -> Option<RootAction> {
        self.action_rx.recv().await
    }

    /// Try to receive a result action without blocking.
    pub fn try_recv_action(&mut self) -> Option<RootAction> {
        self.action_rx.try_recv().ok()
    }

    /// Wait for the next result action and dispatch it.
    ///
    /// Returns the processed action, or `None` if the channel is closed.
    pub async fn process_next(&mut self) -> Option<RootAction> {
        let action = self.recv_action().await?;
        self.dispatch(action.clone());
        Some(action)
    }

    /// Dispatch every result action that is already available.
    ///
    /// Returns the number of actions processed.
    pub fn drain_actions(&mut self) -> usize {
        let mut count = 0;
        while let Some(action) = self.try_recv_action() {
            self.dispatch(action);
            count += 1;
        }
        count
    }

    /// Process result actions until nothing is loading anymore.
    ///
    /// Fails on the first [`RootAction::EffectFailed`]; the failure is
    /// still reduced into the store before returning. Failures of sequence
    /// fetches superseded by a newer project list are ignored.
    pub async fn run_until_settled(&mut self) -> Result<()> {
        while !self.store.read(RootState::is_idle) {
            let action = self
                .recv_action()
                .await
                .context("Effects stopped before loading finished")?;

            let failure = match &action {
                RootAction::EffectFailed { message, .. }
                    if self.store.read(|state| state.accepts(&action)) =>
                {
                    Some(message.clone())
                }
                _ => None,
            };
            self.dispatch(action);

            if let Some(message) = failure {
                bail!(message);
            }
        }
        Ok(())
    }

    /// Load the root state and wait until it has settled.
    pub async fn load(&mut self) -> Result<RootState> {
        self.load_root_state();
        self.run_until_settled()
            .await
            .context("Failed to load root state")?;
        Ok(self.snapshot())
    }

    /// Abort all in-flight requests.
    pub fn stop(&mut self) {
        self.effects.stop();
    }
}
