//! Route compiler subsystem.
//!
//! # Data Flow
//! ```text
//! routes root (filesystem)
//!     → scan.rs (discover files, lexical order)
//!     → descriptor.rs (one RouteDescriptor per file)
//!     → table.rs (precedence sort, static/dynamic/error buckets)
//!     → manifest.rs (serializable emission)
//!     → pass.rs (link pages, publish a RouteSnapshot)
//!
//! Development only:
//!     watcher.rs (file events) → scaffold.rs (blank files) → pass.rs
//! ```
//!
//! # Design Decisions
//! - Passes rebuild everything; descriptors are never patched individually
//! - A failing pass publishes nothing
//! - The server and client trees are compiled separately from one routes root

pub mod descriptor;
pub mod manifest;
pub mod pass;
pub mod path;
pub mod scaffold;
pub mod scan;
pub mod table;
pub mod watcher;

use std::path::{Path, PathBuf};

use crate::config::TreeConfig;
use crate::error::CompileError;

pub use descriptor::{DescriptorBuilder, PrecedenceKey, RouteDescriptor};
pub use pass::CompilePass;
pub use scaffold::Scaffolder;
pub use table::{assemble, CompiledTree};

/// Which route tree a file or table belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tree {
    /// Server-rendered pages.
    Server,
    /// Client-only pages, hydrated in the browser.
    Client,
}

impl Tree {
    pub fn as_str(self) -> &'static str {
        match self {
            Tree::Server => "server",
            Tree::Client => "client",
        }
    }
}

/// Compiles one route tree.
#[derive(Debug, Clone)]
pub struct TreeCompiler {
    tree: Tree,
    builder: DescriptorBuilder,
    filter: scan::TreeFilter,
    manifest: PathBuf,
    lazy: bool,
}

impl TreeCompiler {
    pub fn new(tree: Tree, config: &TreeConfig) -> Self {
        Self {
            tree,
            builder: DescriptorBuilder::new(&config.routes_dir, &config.router_module),
            filter: scan::TreeFilter {
                include: config.include.clone(),
                exclude: config.exclude.clone(),
            },
            manifest: config.manifest.clone(),
            lazy: config.lazy,
        }
    }

    pub fn tree(&self) -> Tree {
        self.tree
    }

    pub fn routes_root(&self) -> &Path {
        self.builder.routes_root()
    }

    /// Whether `path` lies under this tree's routes root.
    pub fn contains(&self, path: &Path) -> bool {
        path::absolutize(path).starts_with(self.routes_root())
    }

    /// Whether `path` is a file of this tree.
    pub fn owns(&self, path: &Path) -> bool {
        self.contains(path) && self.filter.matches(path)
    }

    pub fn describe(&self, file: &Path) -> RouteDescriptor {
        self.builder.describe(file)
    }

    pub fn scan(&self) -> Result<Vec<scan::RouteFile>, CompileError> {
        scan::scan_tree(self.routes_root(), &self.filter)
    }

    /// Scan, describe and assemble.
    pub fn compile(&self) -> Result<CompiledTree, CompileError> {
        let descriptors = self
            .scan()?
            .iter()
            .map(|file| self.builder.describe(&file.path))
            .collect();
        assemble(descriptors)
    }

    /// Stage the manifest for `compiled`; it lands when committed.
    pub fn emit(&self, compiled: &CompiledTree) -> Result<manifest::StagedManifest, CompileError> {
        let manifest = manifest::RouteManifest::from_tree(self.tree.as_str(), self.lazy, compiled);
        manifest::stage_manifest(&self.manifest, &manifest)
    }

    /// Scaffold every blank file of this tree. Returns how many were written.
    pub async fn scaffold_blank(&self, scaffolder: &Scaffolder) -> Result<usize, CompileError> {
        let mut written = 0;
        for file in self.scan()?.into_iter().filter(|f| f.is_blank) {
            if scaffolder.ensure(&file.path, &self.builder.describe(&file.path)).await? {
                written += 1;
            }
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn trees(root: &Path) -> (TreeCompiler, TreeCompiler) {
        let mut server = TreeConfig::server();
        server.routes_dir = root.join("routes");
        server.router_module = root.join("components/Router.tsx");
        server.manifest = root.join("dist/routes.server.json");

        let mut client = TreeConfig::client();
        client.routes_dir = root.join("routes");
        client.router_module = root.join("components/Router.client.tsx");
        client.manifest = root.join("dist/routes.client.json");

        (TreeCompiler::new(Tree::Server, &server), TreeCompiler::new(Tree::Client, &client))
    }

    #[test]
    fn test_trees_split_by_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let routes = dir.path().join("routes");
        fs::create_dir_all(routes.join("user")).unwrap();
        fs::write(routes.join("index.tsx"), "x").unwrap();
        fs::write(routes.join("user/_id.tsx"), "x").unwrap();
        fs::write(routes.join("index.client.tsx"), "x").unwrap();

        let (server, client) = trees(dir.path());
        let server_tree = server.compile().unwrap();
        let client_tree = client.compile().unwrap();

        assert_eq!(server_tree.descriptors.len(), 2);
        assert_eq!(client_tree.descriptors.len(), 1);
        assert!(client_tree.table.static_routes.contains_key("/"));
        assert_eq!(client_tree.descriptors[0].module_path, "../routes/index.client");

        assert!(server.owns(&routes.join("about.tsx")));
        assert!(!server.owns(&routes.join("about.client.tsx")));
        assert!(client.owns(&routes.join("about.client.tsx")));
        assert!(!server.owns(&dir.path().join("elsewhere/about.tsx")));
        assert!(server.contains(&routes.join("user")));
        assert!(!server.owns(&routes.join("user")));

        server.emit(&server_tree).unwrap().commit().unwrap();
        assert!(dir.path().join("dist/routes.server.json").exists());
    }

    #[tokio::test]
    async fn test_scaffold_blank_files() {
        let dir = tempfile::tempdir().unwrap();
        let routes = dir.path().join("routes");
        fs::create_dir_all(&routes).unwrap();
        fs::write(routes.join("_slug.tsx"), "").unwrap();
        fs::write(routes.join("index.tsx"), "keep").unwrap();

        let (server, _) = trees(dir.path());
        let written = server.scaffold_blank(&Scaffolder::new()).await.unwrap();
        assert_eq!(written, 1);
        assert!(fs::read_to_string(routes.join("_slug.tsx")).unwrap().contains("slug: string"));
        assert_eq!(fs::read_to_string(routes.join("index.tsx")).unwrap(), "keep");
    }
}
