//! Maintenance gate (v1)
//!
//! Runs the gate in front of a single upstream.
//!
//! ```text
//!     Client Request           ┌──────────────────────────────────────────┐
//!     ─────────────────────────┼─▶ maintenance middleware                 │
//!                              │      │ enabled? onlyIf? ─── no ──▶ proxy ─┼──▶ Upstream
//!                              │      │ yes                                │
//!     Client Response          │      ▼                                    │
//!     ◀────────────────────────┼── 503 + negotiated maintenance body       │
//!                              │                                           │
//!                              │  config watcher ──▶ snapshot (atomic swap)│
//!                              └──────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use maintenance_gate::config::{load_config, ConfigWatcher};
use maintenance_gate::lifecycle::signals::shutdown_signal;
use maintenance_gate::observability::{logging, metrics};
use maintenance_gate::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "maintenance-gate")]
#[command(about = "Serve a maintenance notice in front of an upstream", long_about = None)]
struct Args {
    /// Path to the configuration file (TOML, or JSON with a .json extension)
    #[arg(short, long, default_value = "maintenance-gate.toml")]
    config: PathBuf,

    /// Do not reload the configuration when the file changes
    #[arg(long)]
    no_watch: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(&args.config)?;

    logging::init(&config.observability.log_filter);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "maintenance-gate starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.address,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        // Already validated by the loader.
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        }
    }

    // Keep the watcher alive for the lifetime of the server.
    let (_watcher, config_updates) = if args.no_watch {
        let (_, rx) = mpsc::unbounded_channel();
        (None, rx)
    } else {
        let (watcher, rx) = ConfigWatcher::new(&args.config);
        (Some(watcher.run()?), rx)
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(config)?;

    let shutdown = Shutdown::new();
    let server_task = tokio::spawn(server.run(listener, config_updates, shutdown.subscribe()));

    shutdown_signal().await;
    shutdown.trigger();
    server_task.await??;

    tracing::info!("Shutdown complete");
    Ok(())
}
