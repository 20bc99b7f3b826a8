//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the router.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RouterConfig {
    /// Production serves precompiled assets; development reads from disk
    /// and rebuilds route tables on change.
    pub mode: Mode,

    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Rendering settings.
    pub render: RenderConfig,

    /// Build output locations.
    pub build: BuildConfig,

    /// Server and client route trees.
    pub routes: RoutesConfig,

    /// Asset variant settings.
    pub assets: AssetsConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Route tree watcher settings (development only).
    pub watcher: WatcherConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Serving mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Development,
    Production,
}

impl Mode {
    pub fn is_production(self) -> bool {
        self == Mode::Production
    }
}

impl std::str::FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "production" => Ok(Mode::Production),
            "development" | "test" => Ok(Mode::Development),
            other => Err(format!("unknown mode: {}", other)),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:3000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3000".to_string(),
        }
    }
}

/// Rendering configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Fixed origin request paths are resolved against.
    pub base_url: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000".to_string(),
        }
    }
}

/// Build output configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Directory holding the client build output (scripts, stylesheets, assets).
    pub out_dir: PathBuf,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("dist/client"),
        }
    }
}

/// Both route trees.
///
/// Each tree table only overrides the fields it names; the rest come from
/// that tree's own defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutesConfig {
    #[serde(deserialize_with = "server_tree")]
    pub server: TreeConfig,
    #[serde(deserialize_with = "client_tree")]
    pub client: TreeConfig,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            server: TreeConfig::server(),
            client: TreeConfig::client(),
        }
    }
}

/// One route tree compiled from the routes root.
#[derive(Debug, Clone, Serialize)]
pub struct TreeConfig {
    /// Routes root directory.
    pub routes_dir: PathBuf,

    /// Location module references are made relative to.
    pub router_module: PathBuf,

    /// File-name suffix selecting this tree's files.
    pub include: String,

    /// File-name suffix excluded from this tree. Empty disables it.
    pub exclude: Option<String>,

    /// Where the compiled route manifest is written.
    pub manifest: PathBuf,

    /// Handlers are loaded on demand by the generated module.
    pub lazy: bool,
}

impl TreeConfig {
    pub fn server() -> Self {
        Self {
            routes_dir: PathBuf::from("src/routes"),
            router_module: PathBuf::from("src/components/Router.tsx"),
            include: ".tsx".to_string(),
            exclude: Some(".client.tsx".to_string()),
            manifest: PathBuf::from("dist/routes.server.json"),
            lazy: false,
        }
    }

    pub fn client() -> Self {
        Self {
            routes_dir: PathBuf::from("src/routes"),
            router_module: PathBuf::from("src/components/Router.client.tsx"),
            include: ".client.tsx".to_string(),
            exclude: None,
            manifest: PathBuf::from("dist/routes.client.json"),
            lazy: true,
        }
    }
}

/// Fields present in a `[routes.*]` table.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TreeOverrides {
    routes_dir: Option<PathBuf>,
    router_module: Option<PathBuf>,
    include: Option<String>,
    exclude: Option<String>,
    manifest: Option<PathBuf>,
    lazy: Option<bool>,
}

impl TreeOverrides {
    fn apply(self, base: TreeConfig) -> TreeConfig {
        TreeConfig {
            routes_dir: self.routes_dir.unwrap_or(base.routes_dir),
            router_module: self.router_module.unwrap_or(base.router_module),
            include: self.include.unwrap_or(base.include),
            exclude: self.exclude.or(base.exclude),
            manifest: self.manifest.unwrap_or(base.manifest),
            lazy: self.lazy.unwrap_or(base.lazy),
        }
    }
}

fn server_tree<'de, D: Deserializer<'de>>(deserializer: D) -> Result<TreeConfig, D::Error> {
    TreeOverrides::deserialize(deserializer).map(|o| o.apply(TreeConfig::server()))
}

fn client_tree<'de, D: Deserializer<'de>>(deserializer: D) -> Result<TreeConfig, D::Error> {
    TreeOverrides::deserialize(deserializer).map(|o| o.apply(TreeConfig::client()))
}

/// Asset variant configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Cache-control directive attached to every variant.
    pub cache_control: String,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            cache_control: "public, max-age=86400".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Route tree watcher configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WatcherConfig {
    /// Poll interval used when native file events are unavailable.
    pub poll_interval_ms: u64,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 500,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error), used when RUST_LOG is unset.
    pub log_level: String,

    /// Emit JSON log lines instead of the human-readable format.
    pub json_logs: Option<bool>,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: None,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
