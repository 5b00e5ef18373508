//! Configuration loading from disk and environment.

use std::fs;
use std::net::SocketAddr;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding the listener port.
pub const ENV_PORT: &str = "PORT";
/// Environment variable overriding the requests-per-second limit.
pub const ENV_RATE_LIMIT: &str = "RATE_LIMIT";
/// Environment variable overriding the database path.
pub const ENV_IP_DB_PATH: &str = "IP_DB_PATH";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration: defaults, then the optional TOML file, then the
/// process environment. The result is validated.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    load_config_with(path, |key| std::env::var(key).ok())
}

/// Same as [`load_config`] with an explicit environment lookup.
pub fn load_config_with<F>(path: Option<&Path>, env: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => AppConfig::default(),
    };

    apply_env_overrides(&mut config, env);
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply `PORT`, `RATE_LIMIT` and `IP_DB_PATH` on top of `config`.
///
/// Unparsable numeric values are ignored and the previous value kept.
pub fn apply_env_overrides<F>(config: &mut AppConfig, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(port) = env(ENV_PORT) {
        match port.trim().parse::<u16>() {
            // An unparsable bind address is left for validation to report.
            Ok(port) => {
                if let Ok(mut addr) = config.listener.bind_address.parse::<SocketAddr>() {
                    addr.set_port(port);
                    config.listener.bind_address = addr.to_string();
                }
            }
            Err(_) => tracing::warn!(value = %port, "Ignoring invalid {}", ENV_PORT),
        }
    }

    if let Some(limit) = env(ENV_RATE_LIMIT) {
        match limit.trim().parse::<i64>() {
            Ok(limit) => config.rate_limit.requests_per_second = limit,
            Err(_) => tracing::warn!(value = %limit, "Ignoring invalid {}", ENV_RATE_LIMIT),
        }
    }

    if let Some(path) = env(ENV_IP_DB_PATH) {
        config.database.path = path;
    }
}
