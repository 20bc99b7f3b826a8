//! Configuration loading from disk and environment.

use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::{Mode, RouterConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable selecting production or development behavior.
pub const MODE_ENV: &str = "PAGE_ROUTER_ENV";

/// Environment variable overriding the listener port.
pub const PORT_ENV: &str = "PORT";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid {name}: {message}")]
    Env { name: &'static str, message: String },

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

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<RouterConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: RouterConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Load the config file if given (defaults otherwise), then apply
/// environment overrides and validate the result.
pub fn resolve_config(path: Option<&Path>) -> Result<RouterConfig, ConfigError> {
    let mut config = match path {
        Some(path) => toml::from_str(&fs::read_to_string(path)?)?,
        None => RouterConfig::default(),
    };

    apply_env(
        &mut config,
        std::env::var(MODE_ENV).ok().as_deref(),
        std::env::var(PORT_ENV).ok().as_deref(),
    )?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply the mode and port overrides.
pub fn apply_env(config: &mut RouterConfig, mode: Option<&str>, port: Option<&str>) -> Result<(), ConfigError> {
    if let Some(mode) = mode {
        config.mode = mode
            .parse::<Mode>()
            .map_err(|message| ConfigError::Env { name: MODE_ENV, message })?;
    }

    if let Some(port) = port {
        let port: u16 = port.parse().map_err(|_| ConfigError::Env {
            name: PORT_ENV,
            message: format!("{:?} is not a port number", port),
        })?;
        let mut addr: SocketAddr = config
            .listener
            .bind_address
            .parse()
            .map_err(|_| ConfigError::Validation(vec![ValidationError::BindAddress(
                config.listener.bind_address.clone(),
            )]))?;
        addr.set_port(port);
        config.listener.bind_address = addr.to_string();
    }

    Ok(())
}
