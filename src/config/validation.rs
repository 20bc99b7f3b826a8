//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, URLs and value ranges
//! - Detect trees that would overwrite each other's manifest
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RouterConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::config::schema::{RouterConfig, TreeConfig};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address {0:?} is not a socket address")]
    BindAddress(String),

    #[error("render.base_url {0:?} is not an absolute http(s) URL")]
    BaseUrl(String),

    #[error("routes.{0}.include must not be empty")]
    EmptyInclude(&'static str),

    #[error("routes.{0}.include is itself excluded by routes.{0}.exclude")]
    IncludeExcluded(&'static str),

    #[error("routes.server and routes.client write the same manifest {0:?}")]
    SharedManifest(String),

    #[error("assets.cache_control must not be empty")]
    EmptyCacheControl,

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroTimeout,

    #[error("observability.metrics_address {0:?} is not a socket address")]
    MetricsAddress(String),
}

pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    match Url::parse(&config.render.base_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        _ => errors.push(ValidationError::BaseUrl(config.render.base_url.clone())),
    }

    for (name, tree) in [("server", &config.routes.server), ("client", &config.routes.client)] {
        check_tree(name, tree, &mut errors);
    }

    if config.routes.server.manifest == config.routes.client.manifest {
        errors.push(ValidationError::SharedManifest(
            config.routes.server.manifest.display().to_string(),
        ));
    }

    if config.assets.cache_control.trim().is_empty() {
        errors.push(ValidationError::EmptyCacheControl);
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_tree(name: &'static str, tree: &TreeConfig, errors: &mut Vec<ValidationError>) {
    if tree.include.is_empty() {
        errors.push(ValidationError::EmptyInclude(name));
    }
    if let Some(exclude) = tree.exclude.as_deref().filter(|e| !e.is_empty()) {
        if tree.include.ends_with(exclude) {
            errors.push(ValidationError::IncludeExcluded(name));
        }
    }
}
