//! Control-plane API access
//!
//! [`ApiService`] is the abstract collaborator the root store effects depend
//! on. [`HttpApiService`] implements it over HTTP; tests substitute fakes.

mod error;
mod http;

pub use error::ApiError;
pub use http::HttpApiService;

use async_trait::async_trait;

use crate::models::{BridgeInfo, KeptnVersions, Metadata, Project, SequenceState};

/// Data access used by the root store effects
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApiService: Send + Sync {
    /// Fetch bridge deployment information
    async fn get_keptn_info(&self) -> Result<BridgeInfo, ApiError>;

    /// Fetch released versions (used for the version check)
    async fn get_available_versions(&self) -> Result<KeptnVersions, ApiError>;

    /// Fetch control-plane metadata
    async fn get_metadata(&self) -> Result<Metadata, ApiError>;

    /// Fetch the first `page_size` projects
    async fn get_projects(&self, page_size: u32) -> Result<Vec<Project>, ApiError>;

    /// Fetch the `limit` most recent sequences of a project
    async fn get_sequences(
        &self,
        project_name: &str,
        limit: u32,
    ) -> Result<Vec<SequenceState>, ApiError>;
}
