//! Asset variant subsystem.
//!
//! # Data Flow
//! ```text
//! Build output (out_dir)
//!     → pipeline.rs (read artifacts, encode variants once)
//!     → AssetRouteTable (public path → identity / gzip / brotli)
//!
//! Request (production):
//!     → negotiate.rs (accept-encoding preference, if-none-match)
//!     → chosen AssetVariant (headers + body) or 304
//! ```
//!
//! # Design Decisions
//! - Identity always exists; compressed variants only for text artifacts
//! - Each variant carries its own validator over its own bytes
//! - Nothing is compressed per request

pub mod negotiate;
pub mod pipeline;
pub mod variant;

pub use negotiate::{not_modified, select, AcceptEncoding};
pub use pipeline::{build_variants, Artifact, AssetEntry, AssetRouteTable};
pub use variant::{AssetKind, AssetVariant, Encoding, VariantHeaders};
