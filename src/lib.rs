//! Word-Ripple: word frequencies across an article's link neighbourhood
//!
//! This crate implements a crawl engine that counts the words of an article and,
//! optionally, of every article reachable from it within a bounded number of link
//! hops, by querying a paginated content API (MediaWiki by default).

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;

use thiserror::Error;

/// Main error type for Word-Ripple operations
#[derive(Debug, Error)]
pub enum RippleError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("The crawl engine must be created inside a tokio runtime: {0}")]
    Runtime(#[from] tokio::runtime::TryCurrentError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Failure of a single content API query
#[derive(Debug, Error)]
pub enum FetchError {
    /// The API answered with a status other than 200 or 429
    #[error("Could not get response from wikipedia because of HTTP {0}")]
    Status(u16),

    /// Every attempt timed out or was rate limited
    #[error("Could not get response from wikipedia (timeout)")]
    RetriesExhausted,

    /// Transport or decoding failure
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Message recorded on a job whose failure was not one of the known kinds
pub const UNKNOWN_ERROR: &str = "An unknown error happened";

impl FetchError {
    /// Returns the message a failed job carries for this error
    ///
    /// Known failure kinds keep their own message. Anything else collapses to
    /// [`UNKNOWN_ERROR`] and the detail goes to the log only.
    pub fn job_message(&self) -> String {
        match self {
            Self::Status(_) | Self::RetriesExhausted => self.to_string(),
            Self::Http(e) => {
                tracing::error!("Task failed: {:?}", e);
                UNKNOWN_ERROR.to_string()
            }
        }
    }
}

/// Result type alias for Word-Ripple operations
pub type Result<T> = std::result::Result<T, RippleError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for content API queries
pub type FetchResult<T> = std::result::Result<T, FetchError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::Coordinator;
pub use state::{JobKey, JobResult, WordCounts};
