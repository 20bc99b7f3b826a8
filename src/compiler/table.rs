//! Route table assembly.
//!
//! # Responsibilities
//! - Order descriptors by precedence (descending, stable)
//! - Partition into static, dynamic and error buckets
//! - Compile dynamic patterns
//!
//! # Design Decisions
//! - Ties keep discovery order
//! - Duplicate static paths or error codes: the later entry replaces the earlier one

use regex::Regex;
use std::collections::HashMap;

use crate::compiler::descriptor::RouteDescriptor;
use crate::error::CompileError;
use crate::routing::matcher::{DynamicRoute, RouteTable};

/// Descriptors of one tree in precedence order, plus the lookup table built from them.
#[derive(Debug, Clone, Default)]
pub struct CompiledTree {
    pub descriptors: Vec<RouteDescriptor>,
    pub table: RouteTable<RouteDescriptor>,
}

/// Sort `descriptors` and materialize the three lookup structures.
pub fn assemble(mut descriptors: Vec<RouteDescriptor>) -> Result<CompiledTree, CompileError> {
    descriptors.sort_by(|a, b| b.precedence_key.cmp(&a.precedence_key));

    for (identifier, files) in shared_identifiers(&descriptors) {
        tracing::warn!(
            identifier,
            files = ?files,
            "Routes share an identifier and will link to the same page"
        );
    }

    let mut table = RouteTable::default();
    for descriptor in &descriptors {
        if let Some(source) = &descriptor.matcher {
            let pattern = Regex::new(source).map_err(|source| CompileError::Pattern {
                identifier: descriptor.identifier.clone(),
                source,
            })?;
            table.dynamic_routes.push(DynamicRoute {
                pattern,
                param_names: descriptor.param_names.clone(),
                entry: descriptor.clone(),
            });
        } else if let Some(code) = descriptor.error_code() {
            if let Some(previous) = table.error_routes.insert(code, descriptor.clone()) {
                tracing::warn!(code, replaced = %previous.file, by = %descriptor.file, "Duplicate error route");
            }
        } else if let Some(previous) = table
            .static_routes
            .insert(descriptor.url_pattern.clone(), descriptor.clone())
        {
            tracing::warn!(
                path = %descriptor.url_pattern,
                replaced = %previous.file,
                by = %descriptor.file,
                "Duplicate static route"
            );
        }
    }

    Ok(CompiledTree { descriptors, table })
}

/// Identifiers produced by more than one descriptor, with their files.
pub fn shared_identifiers(descriptors: &[RouteDescriptor]) -> Vec<(&str, Vec<&str>)> {
    let mut by_identifier: HashMap<&str, Vec<&str>> = HashMap::new();
    for descriptor in descriptors {
        by_identifier
            .entry(descriptor.identifier.as_str())
            .or_default()
            .push(descriptor.file.as_str());
    }

    let mut shared: Vec<_> = by_identifier
        .into_iter()
        .filter(|(_, files)| files.len() > 1)
        .collect();
    shared.sort();
    shared
}
