//! CORS gateway binary.
//!
//! Sits between a browser frontend and the backend API server:
//!
//! ```text
//!     Browser ──▶ /api/* ──▶ ┌──────────────────────────────┐
//!                            │        CORS GATEWAY          │
//!                            │  cors policy → path rewrite  │
//!                            │   → forwarder → relay/502    │
//!                            └──────────────┬───────────────┘
//!     Browser ◀── CORS headers overlaid ◀───┴──▶ Backend API
//! ```
//!
//! `/health` answers locally and is never forwarded.

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use cors_gateway::config::{load_config, GatewayConfig};
use cors_gateway::http::GatewayServer;
use cors_gateway::lifecycle::{self, Shutdown};
use cors_gateway::observability::logging;

#[derive(Debug, Parser)]
#[command(name = "cors-gateway", about = "CORS-injecting reverse proxy for the frontend API")]
struct Args {
    /// Path to a TOML configuration file. Built-in defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };

    logging::init(&config.observability.log_level);

    tracing::info!("cors-gateway v0.1.0 starting");

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.address,
        api_prefix = %config.upstream.api_prefix,
        allowed_origins = ?config.cors.allowed_origins,
        upstream_timeout_ms = config.timeouts.upstream_ms,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(
        address = %local_addr,
        "Listening for connections"
    );

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(lifecycle::shutdown_on_ctrl_c(shutdown));

    let server = GatewayServer::new(config)?;
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
