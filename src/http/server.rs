//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the catch-all dispatcher
//! - Wire up middleware (tracing, timeout, request ID)
//! - Bind server to listener and drain on shutdown

use axum::{routing::any, Router};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use url::Url;

use crate::assets::AssetRouteTable;
use crate::config::{Mode, RouterConfig};
use crate::http::dispatch::dispatch;
use crate::lifecycle::shutdown;
use crate::routing::SnapshotStore;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub mode: Mode,
    /// Current route snapshot; swapped by the compiler.
    pub snapshots: SnapshotStore,
    /// Empty in development.
    pub assets: Arc<AssetRouteTable>,
    pub out_dir: Arc<PathBuf>,
    pub base_url: Arc<Url>,
    /// `base_url` without a trailing slash, prefixed to request paths.
    pub origin: Arc<str>,
}

impl AppState {
    pub fn new(
        config: &RouterConfig,
        snapshots: SnapshotStore,
        assets: AssetRouteTable,
    ) -> Result<Self, url::ParseError> {
        let base_url = Url::parse(&config.render.base_url)?;
        let origin = base_url.origin().ascii_serialization();

        Ok(Self {
            mode: config.mode,
            snapshots,
            assets: Arc::new(assets),
            out_dir: Arc::new(config.build.out_dir.clone()),
            base_url: Arc::new(base_url),
            origin: origin.into(),
        })
    }
}

/// HTTP server for the page router.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(config: &RouterConfig, state: AppState) -> Self {
        Self {
            router: Self::build_router(config, state),
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &RouterConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(dispatch))
            .route("/", any(dispatch))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The fully layered router, for driving requests without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(shutdown_rx))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
