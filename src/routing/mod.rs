//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path)
//!     → router.rs (current snapshot, tree lookup)
//!     → matcher.rs (static map, then ordered dynamic patterns)
//!     → Return: matched page + params, or NoMatch
//!
//! Route Compilation (per pass):
//!     RouteDescriptor[]
//!     → Sort by precedence
//!     → Compile patterns, link pages
//!     → Freeze as immutable RouteSnapshot, swap in atomically
//! ```
//!
//! # Design Decisions
//! - Tables are immutable once published
//! - Deterministic: same input always matches same route
//! - First match wins (ordered by precedence)

pub mod matcher;
pub mod router;

pub use matcher::{Match, Params, RouteTable};
pub use router::{RouteSnapshot, Router, SnapshotStore};
