//! One compilation pass over both route trees.
//!
//! A pass compiles the server and client trees, emits both manifests, links
//! pages and hands back a complete [`RouteSnapshot`]. Nothing is returned
//! unless every step succeeded, so the caller never publishes half a pass.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::compiler::{CompiledTree, Scaffolder, Tree, TreeCompiler};
use crate::config::RoutesConfig;
use crate::error::CompileError;
use crate::observability::metrics;
use crate::render::Pages;
use crate::routing::{RouteSnapshot, Router};

/// Compiles both trees and produces snapshots.
#[derive(Debug)]
pub struct CompilePass {
    server: TreeCompiler,
    client: TreeCompiler,
    pages: Pages,
    generation: AtomicU64,
}

impl CompilePass {
    pub fn new(routes: &RoutesConfig, pages: Pages) -> Self {
        Self {
            server: TreeCompiler::new(Tree::Server, &routes.server),
            client: TreeCompiler::new(Tree::Client, &routes.client),
            pages,
            generation: AtomicU64::new(0),
        }
    }

    pub fn compilers(&self) -> [&TreeCompiler; 2] {
        [&self.server, &self.client]
    }

    /// Whether `path` lies under either routes root.
    pub fn watches(&self, path: &std::path::Path) -> bool {
        self.compilers().into_iter().any(|c| c.contains(path))
    }

    /// Compiler owning `path`, if any.
    pub fn owner(&self, path: &std::path::Path) -> Option<&TreeCompiler> {
        self.compilers().into_iter().find(|c| c.owns(path))
    }

    /// Compile, emit and link both trees.
    pub fn run(&self) -> Result<RouteSnapshot, CompileError> {
        let server = compile_tree(&self.server)?;
        let client = compile_tree(&self.client)?;

        // both manifests are staged before either replaces its predecessor
        let staged = [self.server.emit(&server)?, self.client.emit(&client)?];
        for manifest in staged {
            manifest.commit()?;
        }

        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::info!(
            generation,
            server_routes = server.descriptors.len(),
            client_routes = client.descriptors.len(),
            "Compile pass complete"
        );

        Ok(RouteSnapshot {
            generation,
            server: Router::link(Tree::Server, server.table, self.pages.for_tree(Tree::Server)),
            client: Router::link(Tree::Client, client.table, self.pages.for_tree(Tree::Client)),
        })
    }

    /// Scaffold every blank file in both trees.
    pub async fn scaffold_all(&self, scaffolder: &Scaffolder) -> Result<usize, CompileError> {
        let mut written = 0;
        for compiler in self.compilers() {
            written += compiler.scaffold_blank(scaffolder).await?;
        }
        Ok(written)
    }
}

fn compile_tree(compiler: &TreeCompiler) -> Result<CompiledTree, CompileError> {
    let tree = compiler.tree();
    match compiler.compile() {
        Ok(compiled) => {
            metrics::record_compile_pass(tree, true);
            metrics::record_routes(tree, &compiled.table);
            Ok(compiled)
        }
        Err(e) => {
            metrics::record_compile_pass(tree, false);
            Err(e)
        }
    }
}
