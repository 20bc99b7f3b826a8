//! Startup orchestration.
//!
//! # Responsibilities
//! - Run the initial compile pass (with scaffolding in development)
//! - Build the asset route table (production)
//! - Start the route watcher (development)
//! - Bind listeners and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - Listeners start last (traffic only when ready)

use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use crate::assets::AssetRouteTable;
use crate::compiler::watcher::{DevCompiler, RouteWatcher};
use crate::compiler::{CompilePass, Scaffolder};
use crate::config::RouterConfig;
use crate::error::{CompileError, ServeError};
use crate::http::{AppState, HttpServer};
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::render::Pages;
use crate::routing::SnapshotStore;

/// What a build produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildSummary {
    pub server_routes: usize,
    pub client_routes: usize,
    pub assets: usize,
}

/// Compile both trees once, emit manifests and encode the build output.
pub fn build(config: &RouterConfig, pages: Pages) -> Result<BuildSummary, CompileError> {
    let snapshot = CompilePass::new(&config.routes, pages).run()?;
    let assets = AssetRouteTable::from_out_dir(&config.build.out_dir, &config.assets.cache_control)?;
    metrics::record_assets(assets.len());

    let summary = BuildSummary {
        server_routes: snapshot.server.table().len(),
        client_routes: snapshot.client.table().len(),
        assets: assets.len(),
    };
    tracing::info!(
        server_routes = summary.server_routes,
        client_routes = summary.client_routes,
        assets = summary.assets,
        "Build complete"
    );
    Ok(summary)
}

/// Prepare every subsystem for `config` and serve on `listener` until
/// `shutdown` fires.
pub async fn serve(
    config: RouterConfig,
    pages: Pages,
    listener: TcpListener,
    shutdown: Shutdown,
) -> Result<(), ServeError> {
    let pass = Arc::new(CompilePass::new(&config.routes, pages));

    let (store, assets, watcher) = if config.mode.is_production() {
        let run = pass.clone();
        let snapshot = tokio::task::spawn_blocking(move || run.run()).await??;

        let out_dir = config.build.out_dir.clone();
        let cache_control = config.assets.cache_control.clone();
        let assets = tokio::task::spawn_blocking(move || {
            AssetRouteTable::from_out_dir(&out_dir, &cache_control)
        })
        .await??;
        metrics::record_assets(assets.len());

        (SnapshotStore::new(snapshot), assets, None)
    } else {
        let scaffolder = Arc::new(Scaffolder::new());
        let written = pass.scaffold_all(&scaffolder).await?;
        if written > 0 {
            tracing::info!(written, "Scaffolded blank routes");
        }

        let run = pass.clone();
        let store = SnapshotStore::new(tokio::task::spawn_blocking(move || run.run()).await??);

        let roots = pass.compilers().map(|c| c.routes_root().to_path_buf());
        let (watcher, events) = RouteWatcher::new(
            roots,
            Duration::from_millis(config.watcher.poll_interval_ms),
        );
        let handle = watcher.run()?;

        let compiler = DevCompiler::new(pass.clone(), scaffolder, store.clone());
        tokio::spawn(compiler.run(events, shutdown.subscribe()));

        (store, AssetRouteTable::new(), Some(handle))
    };

    let state = AppState::new(&config, store, assets)?;
    let server = HttpServer::new(&config, state);
    server.run(listener, shutdown.subscribe()).await?;

    drop(watcher);
    Ok(())
}
