//! Constants used throughout the crate
//!
//! This module centralizes magic numbers and strings to reduce duplication
//! and make values easier to maintain.

/// Project page size used when none is configured
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Number of most recent sequences fetched per project
pub const LATEST_SEQUENCES_LIMIT: u32 = 5;

/// Shipyard version assumed when the control plane does not report one
pub const DEFAULT_SUPPORTED_SHIPYARD_VERSION: &str = "0.2.0";

/// Default HTTP request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Environment variable holding the API token unless configured otherwise
pub const DEFAULT_API_TOKEN_ENV: &str = "KEPTN_API_TOKEN";

/// Header carrying the API token
pub const API_TOKEN_HEADER: &str = "x-token";
