//! Process entry point: logging, config, store, and the axum server.

use std::sync::Arc;

use anyhow::Result;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use bintrack_core::service::BinService;
use bintrack_server::{config::ServerConfig, http};
use bintrack_store_memory::MemoryBinStore;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env()?;

    let store = Arc::new(MemoryBinStore::new());
    let service = Arc::new(BinService::new(store));
    let app = http::router(service);

    let listener = TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, "bintrack server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    // Shut down cleanly on ctrl-c; any signal error falls through to the
    // same shutdown path.
    let _ = tokio::signal::ctrl_c().await;
    info!("shutting down");
}
