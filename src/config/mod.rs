//! Configuration module for Word-Ripple
//!
//! This module handles loading, parsing, and validating TOML configuration files,
//! with environment variable overrides applied on top.
//!
//! # Example
//!
//! ```no_run
//! use word_ripple::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Some(Path::new("word-ripple.toml"))).unwrap();
//! println!("Engine will use {} workers", config.engine.workers);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{ApiConfig, Config, EngineConfig};

// Re-export parser functions
pub use parser::{apply_env_overrides, load_config, parse_config, ENV_PREFIX};
pub use validation::validate;
