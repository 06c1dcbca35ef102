//! Configuration schema definitions
//!
//! Defines the structure of configuration files using serde for serialization.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_API_TOKEN_ENV, DEFAULT_PAGE_SIZE, DEFAULT_REQUEST_TIMEOUT_SECS,
    LATEST_SEQUENCES_LIMIT,
};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Base URL of the bridge / control-plane API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Name of the environment variable holding the API token
    #[serde(default = "default_api_token_env")]
    pub api_token_env: String,

    /// Absolute URL of the available-versions document (defaults to the API)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub versions_url: Option<String>,

    /// Number of projects to load; unset means the default of 50
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,

    /// Number of most recent sequences loaded per project
    #[serde(default = "default_sequence_limit")]
    pub sequence_limit: u32,

    /// Allow the available-versions check when the bridge enables it
    #[serde(default = "default_true")]
    pub enable_version_check: bool,

    /// HTTP request timeout
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Logger configuration
    #[serde(default)]
    pub logger: LoggerConfig,
}

/// Logger configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LoggerConfig {
    /// Filter used when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Config {
    /// Project page size with the default applied
    pub fn effective_page_size(&self) -> u32 {
        self.page_size.unwrap_or(DEFAULT_PAGE_SIZE)
    }
}

// Default value functions
fn default_api_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_api_token_env() -> String {
    DEFAULT_API_TOKEN_ENV.to_string()
}

fn default_sequence_limit() -> u32 {
    LATEST_SEQUENCES_LIMIT
}

fn default_true() -> bool {
    true
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_log_level() -> String {
    "debug".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_token_env: default_api_token_env(),
            versions_url: None,
            page_size: None,
            sequence_limit: default_sequence_limit(),
            enable_version_check: default_true(),
            request_timeout_secs: default_request_timeout_secs(),
            logger: LoggerConfig::default(),
        }
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.api_url, "http://localhost:3000");
        assert_eq!(config.api_token_env, "KEPTN_API_TOKEN");
        assert_eq!(config.page_size, None);
        assert_eq!(config.effective_page_size(), 50);
        assert_eq!(config.sequence_limit, 5);
        assert!(config.enable_version_check);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(yaml.contains("apiUrl"));
        assert!(yaml.contains("sequenceLimit"));
        assert!(!yaml.contains("pageSize"));
    }

    #[test]
    fn test_config_deserialization() {
        let yaml = r#"
apiUrl: https://bridge.example.com
pageSize: 20
logger:
  level: info
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.api_url, "https://bridge.example.com");
        assert_eq!(config.effective_page_size(), 20);
        assert_eq!(config.sequence_limit, 5);
        assert_eq!(config.logger.level, "info");
    }
}
