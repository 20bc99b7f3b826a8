//! page-router
//!
//! # Architecture Overview
//!
//! ```text
//!   routes root ──▶ compiler ──▶ RouteSnapshot ──┐   (swapped on change in development)
//!                    (scan, describe,            │
//!                     assemble, emit)            ▼
//!   Client Request ──▶ http server ──▶ dispatch ──┬──▶ asset table (production)
//!                                                 ├──▶ build output (development)
//!                                                 └──▶ render (server + client trees)
//!   build output ──▶ asset pipeline ──▶ AssetRouteTable
//! ```
//!
//! The binary links every route to a placeholder page. Applications embed
//! the library and pass their own [`Pages`] to `lifecycle::serve`.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tokio::net::TcpListener;

use page_router::config::resolve_config;
use page_router::lifecycle::{self, signals, Shutdown};
use page_router::observability::{init_logging, init_metrics};
use page_router::Pages;

/// Config file picked up from the working directory when `--config` is absent.
const DEFAULT_CONFIG: &str = "page-router.toml";

#[derive(Parser)]
#[command(name = "page-router")]
#[command(about = "Filesystem page router and asset server", long_about = None)]
struct Cli {
    /// Path to the TOML config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile routes and serve requests
    Serve,
    /// Compile routes, emit manifests and encode the build output
    Build,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .or_else(|| Path::new(DEFAULT_CONFIG).exists().then(|| PathBuf::from(DEFAULT_CONFIG)));
    let config = resolve_config(config_path.as_deref())?;

    init_logging(&config.observability, config.mode);
    tracing::info!(
        mode = ?config.mode,
        config = ?config_path,
        "page-router v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    match cli.command {
        Commands::Build => {
            lifecycle::build(&config, Pages::default())?;
        }
        Commands::Serve => {
            let listener = TcpListener::bind(&config.listener.bind_address).await?;
            tracing::info!(address = %listener.local_addr()?, "Listening for connections");

            let shutdown = Shutdown::new();
            signals::spawn_signal_handler(shutdown.clone());
            lifecycle::serve(config, Pages::default(), listener, shutdown).await?;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
