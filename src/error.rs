//! Error definitions.
//!
//! Every `CompileError` is fatal for the pass that produced it: a route table
//! or asset set is published whole or not at all.

use std::path::PathBuf;
use thiserror::Error;

use crate::assets::Encoding;

/// Errors raised while compiling route trees or asset variants.
#[derive(Debug, Error)]
pub enum CompileError {
    /// The routes root (or one of its directories) could not be listed.
    #[error("failed to scan routes directory {path}: {source}")]
    Scan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A discovered route file could not be read.
    #[error("failed to read route file {path}: {source}")]
    ReadRoute {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A dynamic route produced a pattern the regex engine rejected.
    #[error("invalid pattern for route {identifier}: {source}")]
    Pattern {
        identifier: String,
        #[source]
        source: regex::Error,
    },

    /// Writing a scaffold or manifest failed.
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The route manifest could not be serialized.
    #[error("failed to serialize route manifest: {0}")]
    Manifest(#[from] serde_json::Error),

    /// A build output artifact could not be read.
    #[error("failed to read build artifact {path}: {source}")]
    ReadArtifact {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Compressing an artifact failed.
    #[error("failed to encode {public_path} as {encoding}: {source}")]
    Encode {
        public_path: String,
        encoding: Encoding,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that stop the process from starting or keep serving.
#[derive(Debug, Error)]
pub enum ServeError {
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error("invalid base url: {0}")]
    BaseUrl(#[from] url::ParseError),

    #[error("failed to watch routes: {0}")]
    Watch(#[from] notify::Error),

    #[error("failed to install metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("server i/o error: {0}")]
    Io(#[from] std::io::Error),
}
