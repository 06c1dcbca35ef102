//! Root store
//!
//! Application state loading, organized like a small reactive store:
//! actions describe what happened, [`RootState::reduce`] applies them and
//! [`RootEffects`] performs the API calls they trigger.

mod actions;
mod api_call;
mod effects;
mod state;

pub use actions::{EffectKind, RootAction};
pub use api_call::{ApiCall, LoadStatus};
pub use effects::{
    EffectSettings, RootEffects, accumulate_latest_sequences, latest_sequences_stream,
    load_keptn_info,
};
pub use state::{LatestSequences, RootState, RootStore};
