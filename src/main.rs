//! Jaqpot MCP server over stdio.
//!
//! Requires `JAQPOT_API_KEY` and `JAQPOT_API_SECRET`; see `config` for the
//! optional settings. Logs go to stderr since stdout carries the protocol.

use std::sync::Arc;

use jaqpot_mcp::rmcp::{transport::stdio, ServiceExt};
use jaqpot_mcp::tools::jaqpot_registry;
use jaqpot_mcp::{Dispatcher, JaqpotClient, JaqpotServer, ServerConfig};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    if let Err(e) = run().await {
        error!("jaqpot-mcp error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::from_env()?;
    let client = JaqpotClient::from_config(&config)?;
    info!("Using Jaqpot API at {}", client.base_url());

    let registry = jaqpot_registry()?;
    info!("Registered {} tools", registry.len());

    let server = JaqpotServer::new(Dispatcher::new(registry, Arc::new(client)));
    let service = server.serve(stdio()).await?;
    service.waiting().await?;

    info!("Client disconnected, shutting down");
    Ok(())
}
