//! Route manifest emission.
//!
//! The manifest is the serializable form of a compiled tree: what a
//! generated routing module would export. Emitting it is independent of
//! assembly and matching.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::compiler::descriptor::RouteDescriptor;
use crate::compiler::table::CompiledTree;
use crate::error::CompileError;

#[derive(Debug, Serialize)]
pub struct RouteManifest<'a> {
    pub tree: &'a str,
    pub lazy: bool,
    /// Descriptors in precedence order.
    pub routes: &'a [RouteDescriptor],
    /// Pathname → identifier.
    pub static_routes: BTreeMap<&'a str, &'a str>,
    /// (pattern, parameter names, identifier) in match order.
    pub dynamic_routes: Vec<(&'a str, &'a [String], &'a str)>,
    /// Status code → identifier.
    pub error_routes: BTreeMap<u16, &'a str>,
}

impl<'a> RouteManifest<'a> {
    pub fn from_tree(tree: &'a str, lazy: bool, compiled: &'a CompiledTree) -> Self {
        let table = &compiled.table;
        Self {
            tree,
            lazy,
            routes: &compiled.descriptors,
            static_routes: table
                .static_routes
                .iter()
                .map(|(path, d)| (path.as_str(), d.identifier.as_str()))
                .collect(),
            dynamic_routes: table
                .dynamic_routes
                .iter()
                .map(|r| (r.pattern.as_str(), r.param_names.as_slice(), r.entry.identifier.as_str()))
                .collect(),
            error_routes: table
                .error_routes
                .iter()
                .map(|(code, d)| (*code, d.identifier.as_str()))
                .collect(),
        }
    }

    pub fn to_json(&self) -> Result<String, CompileError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// A manifest written to a temporary sibling, not yet moved into place.
///
/// Dropping it without [`commit`](Self::commit) removes the temporary file.
#[derive(Debug)]
pub struct StagedManifest {
    tmp: Option<PathBuf>,
    path: PathBuf,
}

impl StagedManifest {
    /// Rename the temporary file over the destination.
    pub fn commit(mut self) -> Result<(), CompileError> {
        let Some(tmp) = self.tmp.take() else {
            return Ok(());
        };
        fs::rename(&tmp, &self.path).map_err(|source| CompileError::Write {
            path: self.path.clone(),
            source,
        })?;

        tracing::debug!(path = %self.path.display(), "Route manifest written");
        Ok(())
    }
}

impl Drop for StagedManifest {
    fn drop(&mut self) {
        if let Some(tmp) = self.tmp.take() {
            let _ = fs::remove_file(tmp);
        }
    }
}

/// Serialize `manifest` next to `path` without replacing it.
pub fn stage_manifest(path: &Path, manifest: &RouteManifest<'_>) -> Result<StagedManifest, CompileError> {
    let json = manifest.to_json()?;
    let write_err = |source| CompileError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).map_err(write_err)?;

    Ok(StagedManifest {
        tmp: Some(tmp),
        path: path.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::descriptor::DescriptorBuilder;
    use crate::compiler::table::assemble;

    #[test]
    fn test_manifest_contents() {
        let builder = DescriptorBuilder::new(Path::new("/app/src/routes"), Path::new("/app/src/components/Router.tsx"));
        let descriptors = ["index.tsx", "user/_id.tsx", "404.tsx"]
            .iter()
            .map(|f| builder.describe(Path::new(f)))
            .collect();
        let compiled = assemble(descriptors).unwrap();
        let manifest = RouteManifest::from_tree("server", false, &compiled);

        let value: serde_json::Value = serde_json::from_str(&manifest.to_json().unwrap()).unwrap();
        assert_eq!(value["tree"], "server");
        assert_eq!(value["static_routes"]["/"], "Index");
        assert_eq!(value["dynamic_routes"][0][0], "^/user/([^/]+?)$");
        assert_eq!(value["dynamic_routes"][0][1][0], "id");
        assert_eq!(value["error_routes"]["404"], "_404");
        assert_eq!(value["routes"][0]["module_path"], "../routes/index");
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dist/routes.server.json");
        let compiled = CompiledTree::default();
        stage_manifest(&path, &RouteManifest::from_tree("server", false, &compiled))
            .unwrap()
            .commit()
            .unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("\"tree\": \"server\""));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_dropped_stage_leaves_destination_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("routes.server.json");
        fs::write(&path, "old").unwrap();

        let compiled = CompiledTree::default();
        let staged = stage_manifest(&path, &RouteManifest::from_tree("server", false, &compiled)).unwrap();
        assert!(path.with_extension("json.tmp").exists());
        drop(staged);

        assert_eq!(fs::read_to_string(&path).unwrap(), "old");
        assert!(!path.with_extension("json.tmp").exists());
    }
}
