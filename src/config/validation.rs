use crate::config::types::{ApiConfig, Config, EngineConfig};
use crate::ConfigError;
use url::Url;

/// Largest number of titles the content API accepts in one query
const MAX_BATCH_SIZE: u32 = 50;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_engine_config(&config.engine)?;
    validate_api_config(&config.api)?;
    Ok(())
}

/// Validates engine configuration
fn validate_engine_config(config: &EngineConfig) -> Result<(), ConfigError> {
    if config.workers < 1 || config.workers > 1000 {
        return Err(ConfigError::Validation(format!(
            "workers must be between 1 and 1000, got {}",
            config.workers
        )));
    }

    if config.batch_size < 1 || config.batch_size > MAX_BATCH_SIZE {
        return Err(ConfigError::Validation(format!(
            "batch_size must be between 1 and {}, got {}",
            MAX_BATCH_SIZE, config.batch_size
        )));
    }

    Ok(())
}

/// Validates content API configuration
fn validate_api_config(config: &ApiConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid api url '{}': {}", config.url, e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "api url '{}' must use HTTP or HTTPS",
            config.url
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.request_timeout_ms < 1 {
        return Err(ConfigError::Validation(
            "request_timeout_ms must be >= 1".to_string(),
        ));
    }

    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "max_attempts must be >= 1, got {}",
            config.max_attempts
        )));
    }

    Ok(())
}
