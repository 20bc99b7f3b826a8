//! Page registry and table linking.
//!
//! # Responsibilities
//! - Map route identifiers to page implementations, per tree
//! - Turn a compiled descriptor table into a renderable table
//!
//! # Design Decisions
//! - Identifiers without a registered page link to a placeholder and log a warning,
//!   so a freshly scaffolded route is servable before its page is wired up

use std::collections::HashMap;
use std::sync::Arc;

use futures_util::future::{BoxFuture, FutureExt};

use crate::compiler::descriptor::RouteDescriptor;
use crate::compiler::Tree;
use crate::render::{Page, RenderContext, RenderError, SHELL_SEAM};
use crate::routing::matcher::RouteTable;

/// Pages of one route tree, keyed by route identifier.
#[derive(Clone, Default)]
pub struct PageRegistry {
    pages: HashMap<String, Arc<dyn Page>>,
}

impl PageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `page` under `identifier`, replacing any previous page.
    pub fn insert(&mut self, identifier: impl Into<String>, page: impl Page + 'static) {
        self.pages.insert(identifier.into(), Arc::new(page));
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, identifier: impl Into<String>, page: impl Page + 'static) -> Self {
        self.insert(identifier, page);
        self
    }

    pub fn get(&self, identifier: &str) -> Option<Arc<dyn Page>> {
        self.pages.get(identifier).cloned()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

impl std::fmt::Debug for PageRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut ids: Vec<&String> = self.pages.keys().collect();
        ids.sort();
        f.debug_struct("PageRegistry").field("pages", &ids).finish()
    }
}

/// Registries for both route trees.
#[derive(Debug, Clone, Default)]
pub struct Pages {
    pub server: PageRegistry,
    pub client: PageRegistry,
}

impl Pages {
    pub fn new(server: PageRegistry, client: PageRegistry) -> Self {
        Self { server, client }
    }

    pub fn for_tree(&self, tree: Tree) -> &PageRegistry {
        match tree {
            Tree::Server => &self.server,
            Tree::Client => &self.client,
        }
    }
}

/// Stand-in for a route whose page has not been registered.
#[derive(Debug, Clone)]
pub enum Placeholder {
    /// Minimal document shell for the server tree.
    Document { title: String },
    /// Empty fragment for the client tree.
    Fragment,
}

impl Placeholder {
    pub fn for_tree(tree: Tree, identifier: &str) -> Self {
        match tree {
            Tree::Server => Placeholder::Document {
                title: identifier.to_string(),
            },
            Tree::Client => Placeholder::Fragment,
        }
    }
}

impl Page for Placeholder {
    fn render<'a>(&'a self, _ctx: &'a RenderContext) -> BoxFuture<'a, Result<String, RenderError>> {
        let html = match self {
            Placeholder::Document { title } => format!(
                "<html lang=\"en\"><head><meta charset=\"utf-8\"><title>{}</title></head><body><div id=\"body\">{}",
                title, SHELL_SEAM
            ),
            Placeholder::Fragment => "<div></div>".to_string(),
        };
        async move { Ok(html) }.boxed()
    }
}

/// Replace each descriptor in `table` with its registered page.
pub fn link_table(
    tree: Tree,
    table: RouteTable<RouteDescriptor>,
    registry: &PageRegistry,
) -> RouteTable<Arc<dyn Page>> {
    table.map(|descriptor| match registry.get(&descriptor.identifier) {
        Some(page) => page,
        None => {
            tracing::warn!(
                tree = tree.as_str(),
                identifier = %descriptor.identifier,
                file = %descriptor.file,
                "No page registered for route, using placeholder"
            );
            Arc::new(Placeholder::for_tree(tree, &descriptor.identifier)) as Arc<dyn Page>
        }
    })
}
