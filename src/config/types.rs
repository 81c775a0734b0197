use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Word-Ripple
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

/// Crawl engine configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Number of fetch tasks allowed to run at once
    #[serde(default = "default_workers")]
    pub workers: u32,

    /// Maximum number of titles queried together in one fetch task
    #[serde(rename = "batch-size", default = "default_batch_size")]
    pub batch_size: u32,
}

/// Content API connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Endpoint of the MediaWiki-style query API
    #[serde(default = "default_api_url")]
    pub url: String,

    /// User agent sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Bearer token raising the API's rate limits
    #[serde(rename = "access-token", default)]
    pub access_token: Option<String>,

    /// Per-request timeout (milliseconds)
    #[serde(rename = "request-timeout-ms", default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Attempts per request before giving up on timeouts and rate limits
    #[serde(rename = "max-attempts", default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            batch_size: default_batch_size(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: default_api_url(),
            user_agent: default_user_agent(),
            access_token: None,
            request_timeout_ms: default_request_timeout_ms(),
            max_attempts: default_max_attempts(),
        }
    }
}

fn default_workers() -> u32 {
    200
}

fn default_batch_size() -> u32 {
    5
}

fn default_api_url() -> String {
    "https://en.wikipedia.org/w/api.php".to_string()
}

fn default_user_agent() -> String {
    "word-ripple/1.0 (contact@example.com)".to_string()
}

fn default_request_timeout_ms() -> u64 {
    3000
}

fn default_max_attempts() -> u32 {
    5
}
