//! keptn-bridge library
//!
//! Headless core of the Keptn Bridge: event ("trace") classification,
//! sequence and project models, and a root store that loads bridge info,
//! projects and each project's latest sequences.
//!
//! - [`models`] - JSON models and their classification logic
//! - [`api`] - the [`api::ApiService`] seam and its HTTP implementation
//! - [`store`] - actions, reducer and effects
//! - [`services`] - [`services::BridgeSession`], the headless entry point

pub mod api;
pub mod cli;
pub mod config;
pub mod constants;
pub mod models;
pub mod services;
pub mod store;

// Re-export commonly used types for convenience
pub use api::{ApiError, ApiService, HttpApiService};
pub use models::{Project, SequenceState, Trace, group_by_context};
pub use services::BridgeSession;
pub use store::{LoadStatus, RootAction, RootState, RootStore};
