//! Configuration loading logic
//!
//! Handles loading configuration from the config file and environment
//! variables according to precedence rules.

use super::{defaults, paths, schema::Config};
use anyhow::{Context, Result};
use std::path::Path;

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with all layers applied
    ///
    /// Precedence order (highest to lowest):
    /// 1. Environment variable overrides
    /// 2. Root config file
    /// 3. Built-in defaults
    pub fn load() -> Result<Config> {
        Self::load_from(&paths::root_config_path())
    }

    /// Load configuration using `path` as the config file
    ///
    /// A missing file is not an error; defaults are used instead.
    pub fn load_from(path: &Path) -> Result<Config> {
        let config = if path.exists() {
            Self::load_file(path)?
        } else {
            tracing::debug!("No config file at {}, using defaults", path.display());
            Self::load_defaults()
        };

        Ok(Self::apply_env_overrides(config))
    }

    /// Load configuration from a file
    pub fn load_file(path: &Path) -> Result<Config> {
        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found: {}", path.display()));
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate the configuration file at `path`
    ///
    /// Fails on invalid YAML, invalid value types, an unparsable API URL or a
    /// zero page size / sequence limit.
    pub fn validate(path: &Path) -> Result<Config> {
        let config = Self::load_from(path)?;

        url::Url::parse(&config.api_url)
            .with_context(|| format!("apiUrl is not a valid URL: {}", config.api_url))?;

        if let Some(versions_url) = &config.versions_url {
            url::Url::parse(versions_url)
                .with_context(|| format!("versionsUrl is not a valid URL: {}", versions_url))?;
        }

        if config.page_size == Some(0) {
            anyhow::bail!("pageSize must be greater than 0");
        }

        if config.sequence_limit == 0 {
            anyhow::bail!("sequenceLimit must be greater than 0");
        }

        Ok(config)
    }

    /// Load default configuration
    pub fn load_defaults() -> Config {
        defaults::default_config()
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(mut config: Config) -> Config {
        // KEPTN_BRIDGE_API_URL override
        if let Ok(api_url) = std::env::var("KEPTN_BRIDGE_API_URL") {
            config.api_url = api_url;
        }

        // KEPTN_BRIDGE_PAGE_SIZE override
        if let Ok(page_size) = std::env::var("KEPTN_BRIDGE_PAGE_SIZE") {
            match page_size.parse::<u32>() {
                Ok(val) => config.page_size = Some(val),
                Err(_) => tracing::warn!("Ignoring invalid KEPTN_BRIDGE_PAGE_SIZE: {}", page_size),
            }
        }

        // KEPTN_BRIDGE_VERSION_CHECK override
        if let Ok(version_check) = std::env::var("KEPTN_BRIDGE_VERSION_CHECK") {
            if let Ok(val) = version_check.parse::<bool>() {
                config.enable_version_check = val;
            }
        }

        config
    }

    /// Save configuration to a file
    pub fn save(config: &Config, path: &Path) -> Result<()> {
        // Ensure directory exists
        if let Some(parent) = path.parent() {
            paths::ensure_dir(parent)?;
        }

        let yaml =
            serde_yaml::to_string(config).context("Failed to serialize configuration to YAML")?;

        std::fs::write(path, yaml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Save root configuration
    pub fn save_root(config: &Config) -> Result<()> {
        Self::save(config, &paths::root_config_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(config.effective_page_size(), 50);
        assert_eq!(config.sequence_limit, 5);
    }

    #[test]
    fn test_env_overrides() {
        // SAFETY: set_var is unsafe in Rust 2024 due to potential data races.
        // This is the only test in this binary touching these variables.
        unsafe {
            std::env::set_var("KEPTN_BRIDGE_API_URL", "https://bridge.test");
            std::env::set_var("KEPTN_BRIDGE_PAGE_SIZE", "10");
            std::env::set_var("KEPTN_BRIDGE_VERSION_CHECK", "false");
        }

        let config = ConfigLoader::apply_env_overrides(Config::default());

        assert_eq!(config.api_url, "https://bridge.test");
        assert_eq!(config.page_size, Some(10));
        assert!(!config.enable_version_check);

        // SAFETY: see above.
        unsafe {
            std::env::remove_var("KEPTN_BRIDGE_API_URL");
            std::env::remove_var("KEPTN_BRIDGE_PAGE_SIZE");
            std::env::remove_var("KEPTN_BRIDGE_VERSION_CHECK");
        }
    }
}
