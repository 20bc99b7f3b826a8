//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, request ID)
//!     → dispatch.rs (asset table, dev passthrough, render, error path)
//!     → response.rs (headers, bodies, status lines)
//!     → Send to client
//! ```

pub mod dispatch;
pub mod response;
pub mod server;

pub use server::{AppState, HttpServer};
