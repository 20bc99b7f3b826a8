//! Page rendering subsystem.
//!
//! # Data Flow
//! ```text
//! RouteTable<RouteDescriptor>  (compiler output)
//!     → registry.rs (link identifiers to Page implementations)
//!     → Router (RouteTable<Arc<dyn Page>>)
//!     → Page::render(RenderContext) → markup string
//!     → document.rs (splice head + body into one document)
//! ```
//!
//! # Design Decisions
//! - Markup generation is opaque: a page is anything that turns props into a string
//! - Panics inside a page surface as `RenderError::Panicked`
//! - Pages never touch route tables, so abandoned renders cannot corrupt them

pub mod document;
pub mod registry;

use futures_util::future::{BoxFuture, FutureExt};
use std::panic::AssertUnwindSafe;
use thiserror::Error;
use url::Url;

pub use crate::routing::matcher::Params;
pub use document::{assemble_document, HYDRATION_SCRIPT, SHELL_SEAM};
pub use registry::{link_table, PageRegistry, Pages, Placeholder};

/// Failure while producing markup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// Page logic asked for a specific status (e.g. 404 for a missing record).
    #[error("render aborted with status {0}")]
    Status(u16),

    #[error("render failed: {0}")]
    Failed(String),

    #[error("render panicked")]
    Panicked,

    /// The head render does not end with the document shell seam.
    #[error("document shell is missing the closing seam")]
    MissingSeam,
}

/// Inputs handed to a page render.
#[derive(Debug, Clone)]
pub struct RenderContext {
    /// Request URL resolved against the base origin.
    pub url: Url,
    /// Parameters bound by the route match.
    pub params: Params,
}

impl RenderContext {
    pub fn new(url: Url, params: Params) -> Self {
        Self { url, params }
    }
}

/// A renderable page.
pub trait Page: Send + Sync {
    fn render<'a>(&'a self, ctx: &'a RenderContext) -> BoxFuture<'a, Result<String, RenderError>>;
}

/// Page backed by a synchronous closure.
pub struct FnPage<F>(F);

impl<F> Page for FnPage<F>
where
    F: Fn(&RenderContext) -> Result<String, RenderError> + Send + Sync,
{
    fn render<'a>(&'a self, ctx: &'a RenderContext) -> BoxFuture<'a, Result<String, RenderError>> {
        let result = (self.0)(ctx);
        async move { result }.boxed()
    }
}

/// Wrap a closure as a [`Page`].
pub fn page_fn<F>(f: F) -> FnPage<F>
where
    F: Fn(&RenderContext) -> Result<String, RenderError> + Send + Sync,
{
    FnPage(f)
}

/// Render `page`, converting a panic into `RenderError::Panicked`.
pub async fn render_guarded(page: &dyn Page, ctx: &RenderContext) -> Result<String, RenderError> {
    // the closure form also catches panics raised before the future is built
    let future = match std::panic::catch_unwind(AssertUnwindSafe(|| page.render(ctx))) {
        Ok(future) => future,
        Err(_) => return Err(RenderError::Panicked),
    };

    match AssertUnwindSafe(future).catch_unwind().await {
        Ok(result) => result,
        Err(_) => Err(RenderError::Panicked),
    }
}
