//! Service layer
//!
//! Headless entry points that combine the API client and the root store.
//! Front ends (the CLI) use these instead of driving the store directly.

pub mod bridge_session;

pub use bridge_session::BridgeSession;
