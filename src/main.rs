//! Storefront gate server.
//!
//! ```text
//!     Client Request
//!     ──────────────▶ request id ─▶ trace ─▶ route match ─▶ feature gate ─▶ dispatch
//!                                                │               │
//!                                          suppressed or    disabled context
//!                                            unknown              │
//!                                                ▼               ▼
//!     ◀────────────────────────────────── 404 Route not found ◀───┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use storefront_gate::config::{load_config, ConfigWatcher, GateConfig};
use storefront_gate::lifecycle::{wait_for_signal, Shutdown};
use storefront_gate::observability::{logging, metrics};
use storefront_gate::HttpServer;

#[derive(Parser)]
#[command(name = "storefront-gate")]
#[command(about = "Serve a storefront route table with disabled features removed", long_about = None)]
struct Args {
    /// Path to the TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Do not reload when the config or route files change.
    #[arg(long)]
    no_watch: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => GateConfig::default(),
    };

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "storefront-gate starting");

    tracing::info!(
        bind_address = %config.listener.bind_address,
        imports = config.routing.imports.len(),
        channels = config.channels.len(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config)?;

    // Keep the watcher alive for the lifetime of the server.
    let (config_updates, _watcher) = match (&args.config, args.no_watch) {
        (Some(path), false) => {
            let (watcher, updates) = ConfigWatcher::new(path, server.resources());
            (updates, Some(watcher.run()?))
        }
        _ => (mpsc::unbounded_channel().1, None),
    };

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        wait_for_signal().await;
        signal_shutdown.trigger();
    });

    server.run(listener, config_updates, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
