//! Filesystem page router and request-serving engine.
//!
//! Page files under a routes root are compiled into route tables (one for
//! server-rendered pages, one for client pages). Requests are answered from
//! a precompiled asset table, or by rendering the matched page.

pub mod assets;
pub mod compiler;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod render;
pub mod routing;

pub use config::schema::RouterConfig;
pub use error::{CompileError, ServeError};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use render::{page_fn, Page, PageRegistry, Pages, RenderContext, RenderError};
