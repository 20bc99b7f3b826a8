//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Hold the linked route tables of both trees
//! - Resolve a URL to a page and render it
//! - Publish whole snapshots atomically
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Readers load one snapshot per request and keep it for the whole request
//! - Explicit `None` rather than silent default when nothing matches

use arc_swap::ArcSwap;
use std::sync::Arc;
use url::Url;

use crate::compiler::descriptor::RouteDescriptor;
use crate::compiler::Tree;
use crate::render::{link_table, render_guarded, Page, PageRegistry, RenderContext, RenderError};
use crate::routing::matcher::{Match, RouteTable};

/// Renderable route table of one tree.
#[derive(Clone)]
pub struct Router {
    tree: Tree,
    table: RouteTable<Arc<dyn Page>>,
}

impl Router {
    /// Link a compiled table against `registry`.
    pub fn link(tree: Tree, table: RouteTable<RouteDescriptor>, registry: &PageRegistry) -> Self {
        Self {
            tree,
            table: link_table(tree, table, registry),
        }
    }

    pub fn empty(tree: Tree) -> Self {
        Self {
            tree,
            table: RouteTable::default(),
        }
    }

    pub fn tree(&self) -> Tree {
        self.tree
    }

    pub fn table(&self) -> &RouteTable<Arc<dyn Page>> {
        &self.table
    }

    /// Resolve a URL against this tree.
    pub fn resolve(&self, url: &Url) -> Option<Match<'_, Arc<dyn Page>>> {
        self.table.match_path(url.path())
    }

    /// Resolve `url` and render the matched page, or `None` when unmatched.
    pub async fn render(&self, url: &Url) -> Option<Result<String, RenderError>> {
        let matched = self.resolve(url)?;
        let ctx = RenderContext::new(url.clone(), matched.params);
        Some(render_guarded(matched.entry.as_ref(), &ctx).await)
    }

    /// Page registered for an error status, if any.
    pub fn error_page(&self, code: u16) -> Option<&Arc<dyn Page>> {
        self.table.error_route(code)
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("tree", &self.tree)
            .field("static_routes", &self.table.static_routes.len())
            .field("dynamic_routes", &self.table.dynamic_routes.len())
            .field("error_routes", &self.table.error_routes.len())
            .finish()
    }
}

/// Both trees as produced by one compilation pass.
#[derive(Debug, Clone)]
pub struct RouteSnapshot {
    pub generation: u64,
    pub server: Router,
    pub client: Router,
}

impl RouteSnapshot {
    pub fn empty() -> Self {
        Self {
            generation: 0,
            server: Router::empty(Tree::Server),
            client: Router::empty(Tree::Client),
        }
    }
}

/// Single swappable reference to the current snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    current: Arc<ArcSwap<RouteSnapshot>>,
}

impl SnapshotStore {
    pub fn new(initial: RouteSnapshot) -> Self {
        Self {
            current: Arc::new(ArcSwap::from_pointee(initial)),
        }
    }

    /// The snapshot in effect right now.
    pub fn load(&self) -> Arc<RouteSnapshot> {
        self.current.load_full()
    }

    /// Replace the snapshot wholesale.
    pub fn publish(&self, snapshot: RouteSnapshot) {
        tracing::info!(
            generation = snapshot.generation,
            server_routes = snapshot.server.table().len(),
            client_routes = snapshot.client.table().len(),
            "Route snapshot published"
        );
        self.current.store(Arc::new(snapshot));
    }
}
