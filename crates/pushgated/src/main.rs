//! pushgated — the pushgate daemon.
//!
//! Single binary that assembles the metrics cache:
//! - In-memory metric store + write-queue apply loop
//! - Handler counters
//! - HTTP API (push, delete, scrape, probes)
//!
//! # Usage
//!
//! ```text
//! pushgated --port 9091 --queue-capacity 1024
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tokio::sync::watch;
use tracing::info;

use pushgate_metrics::HandlerCounters;
use pushgate_store::InMemoryStore;

#[derive(Parser)]
#[command(name = "pushgated", about = "pushgate daemon")]
struct Cli {
    /// Port to listen on.
    #[arg(long, default_value = "9091")]
    port: u16,

    /// Capacity of the write-request queue.
    #[arg(long, default_value = "1024")]
    queue_capacity: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,pushgated=debug,pushgate=debug".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    info!("pushgate daemon starting");

    // ── Initialize subsystems ──────────────────────────────────

    let (store, apply_loop) = InMemoryStore::new(cli.queue_capacity);
    info!(queue_capacity = cli.queue_capacity, "metric store initialized");

    let counters = HandlerCounters::new();

    // ── Shutdown signal ────────────────────────────────────────

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // ── Start the apply loop ───────────────────────────────────

    let apply_handle = tokio::spawn(apply_loop.run(shutdown_rx));

    // ── Start the API server ───────────────────────────────────

    let router = pushgate_api::build_router(Arc::new(store), counters);
    let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));

    info!(%addr, "API server starting");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Graceful shutdown on Ctrl-C.
    let server = axum::serve(listener, router).with_graceful_shutdown(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install CTRL+C handler");
        info!("shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    server.await?;

    // Let the apply loop drain what is still queued.
    let _ = apply_handle.await;

    info!("pushgate daemon stopped");
    Ok(())
}
