use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;
use std::str::FromStr;

/// Prefix of the environment variables that override file settings
pub const ENV_PREFIX: &str = "WORD_RIPPLE_";

/// Loads, overrides and validates the configuration
///
/// # Arguments
///
/// * `path` - Path to a TOML configuration file, or `None` for built-in defaults
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use word_ripple::config::load_config;
///
/// let config = load_config(Some(Path::new("word-ripple.toml"))).unwrap();
/// println!("Batch size: {}", config.engine.batch_size);
/// ```
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let config = match path {
        Some(path) => parse_config(&std::fs::read_to_string(path)?)?,
        None => Config::default(),
    };

    let config = apply_env_overrides(config, std::env::vars())?;

    validate(&config)?;

    Ok(config)
}

/// Parses TOML content into a configuration without validating it
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Applies `WORD_RIPPLE_*` overrides from the given variables
///
/// Unrelated variables are ignored. A recognised variable whose value does not
/// parse is reported as a validation error.
pub fn apply_env_overrides<I>(mut config: Config, vars: I) -> Result<Config, ConfigError>
where
    I: IntoIterator<Item = (String, String)>,
{
    for (name, value) in vars {
        let Some(key) = name.strip_prefix(ENV_PREFIX) else {
            continue;
        };

        match key {
            "WORKERS" => config.engine.workers = parse_number(&name, &value)?,
            "BATCH_SIZE" => config.engine.batch_size = parse_number(&name, &value)?,
            "API_URL" => config.api.url = value,
            "USER_AGENT" => config.api.user_agent = value,
            "ACCESS_TOKEN" => {
                config.api.access_token = Some(value).filter(|token| !token.is_empty())
            }
            _ => tracing::debug!("Ignoring unknown override {}", name),
        }
    }

    Ok(config)
}

fn parse_number<T: FromStr>(name: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| {
        ConfigError::Validation(format!("{} must be a number, got '{}'", name, value))
    })
}
