//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! page-router.toml (optional)
//!     → loader.rs (parse & deserialize, apply PAGE_ROUTER_ENV / PORT)
//!     → validation.rs (semantic checks)
//!     → RouterConfig (validated, immutable)
//!     → lifecycle::build / lifecycle::serve (by reference or by value)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; only route tables are rebuilt at runtime
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, resolve_config, ConfigError};
pub use schema::RouterConfig;
pub use schema::{AssetsConfig, BuildConfig, ListenerConfig, Mode, ObservabilityConfig, RoutesConfig, TreeConfig};
