//! HTTP implementation of the control-plane API

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

use super::{ApiError, ApiService};
use crate::config::Config;
use crate::constants::API_TOKEN_HEADER;
use crate::models::{BridgeInfo, KeptnVersions, Metadata, Project, ProjectsPage, SequenceState};

/// Response envelope of the sequence endpoint
#[derive(Debug, Deserialize)]
struct SequencesPage {
    #[serde(default)]
    states: Vec<SequenceState>,
}

/// Control-plane API client over reqwest
pub struct HttpApiService {
    client: reqwest::Client,
    base_url: Url,
    versions_url: Option<Url>,
    token: Option<String>,
}

impl HttpApiService {
    /// Create a client from configuration
    ///
    /// The API token is read from the environment variable named by
    /// `apiTokenEnv`; requests go out unauthenticated if it is unset.
    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        let token = std::env::var(&config.api_token_env).ok();
        if token.is_none() {
            tracing::debug!(
                "Environment variable {} not set, sending requests without API token",
                config.api_token_env
            );
        }

        let mut service = Self::new(
            &config.api_url,
            token,
            Duration::from_secs(config.request_timeout_secs),
        )?;
        if let Some(versions_url) = &config.versions_url {
            service.versions_url = Some(Url::parse(versions_url)?);
        }
        Ok(service)
    }

    /// Create a client for `base_url`
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self, ApiError> {
        let mut base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::CannotBeABase(base_url.to_string()));
        }
        // Relative joins replace the last segment unless the path ends in '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::Client)?;

        tracing::debug!("Created API client for: {}", base_url);

        Ok(Self {
            client,
            base_url,
            versions_url: None,
            token,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base_url.join(path)?)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        tracing::debug!("Fetching: {}", url);

        let mut req = self.client.get(url.clone());
        if let Some(token) = &self.token {
            req = req.header(API_TOKEN_HEADER, token);
        }

        let resp = req.send().await.map_err(|source| ApiError::Request {
            url: url.to_string(),
            source,
        })?;

        if !resp.status().is_success() {
            return Err(ApiError::Status {
                url: url.to_string(),
                status: resp.status().as_u16(),
            });
        }

        let data = resp.json().await.map_err(|source| ApiError::Decode {
            url: url.to_string(),
            source,
        })?;

        tracing::debug!("Successfully fetched: {}", url);

        Ok(data)
    }
}

#[async_trait]
impl ApiService for HttpApiService {
    async fn get_keptn_info(&self) -> Result<BridgeInfo, ApiError> {
        self.get_json(self.endpoint("api/bridgeInfo")?).await
    }

    async fn get_available_versions(&self) -> Result<KeptnVersions, ApiError> {
        let url = match &self.versions_url {
            Some(url) => url.clone(),
            None => self.endpoint("api/version.json")?,
        };
        self.get_json(url).await
    }

    async fn get_metadata(&self) -> Result<Metadata, ApiError> {
        self.get_json(self.endpoint("api/v1/metadata")?).await
    }

    async fn get_projects(&self, page_size: u32) -> Result<Vec<Project>, ApiError> {
        let mut url = self.endpoint("api/controlPlane/v1/project")?;
        url.query_pairs_mut()
            .append_pair("disableUpstreamSync", "true")
            .append_pair("pageSize", &page_size.to_string());

        let page: ProjectsPage = self.get_json(url).await?;
        Ok(page.projects)
    }

    async fn get_sequences(
        &self,
        project_name: &str,
        limit: u32,
    ) -> Result<Vec<SequenceState>, ApiError> {
        let mut url = self.endpoint("api/controlPlane/v1/sequence/")?;
        url.path_segments_mut()
            .map_err(|_| ApiError::CannotBeABase(self.base_url.to_string()))?
            .pop_if_empty()
            .push(project_name);
        url.query_pairs_mut()
            .append_pair("pageSize", &limit.to_string());

        let page: SequencesPage = self.get_json(url).await?;
        Ok(page.states)
    }
}
