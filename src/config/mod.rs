//! Configuration system for keptn-bridge
//!
//! Layers a YAML config file over built-in defaults, with environment
//! variable overrides on top.

mod defaults;
pub mod loader;
pub mod paths;
pub mod schema;

pub use loader::ConfigLoader;
pub use schema::{Config, LoggerConfig};

/// Get a configuration value by key (dot notation)
pub fn get_config_value(config: &Config, key: &str) -> anyhow::Result<String> {
    match key {
        "apiUrl" => Ok(config.api_url.clone()),
        "apiTokenEnv" => Ok(config.api_token_env.clone()),
        "versionsUrl" => Ok(config.versions_url.clone().unwrap_or_default()),
        "pageSize" => Ok(config
            .page_size
            .map(|size| size.to_string())
            .unwrap_or_default()),
        "sequenceLimit" => Ok(config.sequence_limit.to_string()),
        "enableVersionCheck" => Ok(config.enable_version_check.to_string()),
        "requestTimeoutSecs" => Ok(config.request_timeout_secs.to_string()),
        "logger.level" => Ok(config.logger.level.clone()),
        _ => Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
    }
}

/// Set a configuration value by key (dot notation)
///
/// An empty value clears optional keys (`versionsUrl`, `pageSize`).
pub fn set_config_value(config: &mut Config, key: &str, value: &str) -> anyhow::Result<()> {
    use anyhow::Context;
    match key {
        "apiUrl" => {
            url::Url::parse(value).context("apiUrl must be a valid URL")?;
            config.api_url = value.to_string();
        }
        "apiTokenEnv" => {
            config.api_token_env = value.to_string();
        }
        "versionsUrl" => {
            if value.is_empty() {
                config.versions_url = None;
            } else {
                url::Url::parse(value).context("versionsUrl must be a valid URL")?;
                config.versions_url = Some(value.to_string());
            }
        }
        "pageSize" => {
            if value.is_empty() {
                config.page_size = None;
            } else {
                let size: u32 = value.parse().context("pageSize must be a number")?;
                if size == 0 {
                    return Err(anyhow::anyhow!("pageSize must be greater than 0"));
                }
                config.page_size = Some(size);
            }
        }
        "sequenceLimit" => {
            let limit: u32 = value.parse().context("sequenceLimit must be a number")?;
            if limit == 0 {
                return Err(anyhow::anyhow!("sequenceLimit must be greater than 0"));
            }
            config.sequence_limit = limit;
        }
        "enableVersionCheck" => {
            config.enable_version_check = value
                .parse()
                .context("enableVersionCheck must be 'true' or 'false'")?;
        }
        "requestTimeoutSecs" => {
            config.request_timeout_secs = value
                .parse()
                .context("requestTimeoutSecs must be a number")?;
        }
        "logger.level" => {
            config.logger.level = value.to_string();
        }
        _ => return Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
    }

    Ok(())
}
