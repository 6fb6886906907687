use crate::config::types::{Config, CrawlerConfig, HttpConfig, StorageConfig};
use crate::{ConfigError, ConfigResult};
use url::Url;

/// Upper bound on concurrent fetch workers
pub const MAX_WORKERS: u32 = 64;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_crawler_config(&config.crawler)?;
    validate_http_config(&config.http)?;
    validate_storage_config(&config.storage)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> ConfigResult<()> {
    // max_depth >= 0 is always true for u32, and a zero delay is allowed

    if config.workers < 1 || config.workers > MAX_WORKERS {
        return Err(ConfigError::Validation(format!(
            "workers must be between 1 and {}, got {}",
            MAX_WORKERS, config.workers
        )));
    }

    Ok(())
}

/// Validates HTTP client configuration
fn validate_http_config(config: &HttpConfig) -> ConfigResult<()> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.request_timeout.is_zero() {
        return Err(ConfigError::Validation(
            "request-timeout must be greater than zero".to_string(),
        ));
    }

    if config.connect_timeout.is_zero() {
        return Err(ConfigError::Validation(
            "connect-timeout must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

/// Validates storage configuration
fn validate_storage_config(config: &StorageConfig) -> ConfigResult<()> {
    if config.base_dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "base-dir cannot be empty".to_string(),
        ));
    }

    if config.index_file.is_empty() || config.index_file.contains(['/', '\\']) {
        return Err(ConfigError::Validation(format!(
            "index-file must be a plain filename, got '{}'",
            config.index_file
        )));
    }

    Ok(())
}

/// Validates the seed URL given on the command line
///
/// The seed must be absolute and use http or https, since it is the base every
/// discovered reference is resolved against.
pub fn validate_seed(seed: &str) -> ConfigResult<Url> {
    let url = Url::parse(seed)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Seed URL '{}' must use http or https",
            seed
        )));
    }

    Ok(url)
}
