//! Placeholder implementations for blank route files.
//!
//! # Design Decisions
//! - Never overwrites a file with non-whitespace content
//! - Writes to the same file are serialized through a per-path lock
//! - Development only; production passes never call into this module

use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::compiler::descriptor::RouteDescriptor;
use crate::error::CompileError;

/// Source text of the default implementation for `descriptor`.
///
/// Static routes get a no-argument render function; dynamic routes take
/// exactly their parameters, each typed as a string.
pub fn scaffold_source(descriptor: &RouteDescriptor) -> String {
    let signature = if descriptor.param_names.is_empty() {
        "()".to_string()
    } else {
        let fields: Vec<String> = descriptor
            .param_names
            .iter()
            .map(|name| format!("{}: string", name))
            .collect();
        format!("(props: {{ {} }})", fields.join("; "))
    };

    format!(
        "export default {} => {{\n  return <div></div>;\n}};\n",
        signature
    )
}

/// Writes scaffolds, one writer per file at a time.
#[derive(Debug, Default)]
pub struct Scaffolder {
    locks: DashMap<PathBuf, Arc<Mutex<()>>>,
}

impl Scaffolder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write the default implementation into `path` if it is blank.
    ///
    /// Returns `true` when a scaffold was written. A file that vanished
    /// before it could be read is skipped.
    pub async fn ensure(&self, path: &Path, descriptor: &RouteDescriptor) -> Result<bool, CompileError> {
        let lock = self.locks.entry(path.to_path_buf()).or_default().clone();
        let result = {
            let _guard = lock.lock().await;
            write_if_blank(path, descriptor).await
        };

        drop(lock);
        // only the map still holds it, so no writer is waiting on this path
        self.locks.remove_if(path, |_, l| Arc::strong_count(l) == 1);
        result
    }
}

async fn write_if_blank(path: &Path, descriptor: &RouteDescriptor) -> Result<bool, CompileError> {
    let existing = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(source) => {
            return Err(CompileError::ReadRoute {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    if !existing.iter().all(u8::is_ascii_whitespace) {
        return Ok(false);
    }

    tokio::fs::write(path, scaffold_source(descriptor))
        .await
        .map_err(|source| CompileError::Write {
            path: path.to_path_buf(),
            source,
        })?;

    tracing::info!(file = %descriptor.file, identifier = %descriptor.identifier, "Scaffolded empty route");
    Ok(true)
}
