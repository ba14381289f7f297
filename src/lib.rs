// src/lib.rs

pub mod api;
pub mod config;
pub mod core;
pub mod logging;

use std::sync::Arc;

use color_eyre::eyre::Result;
use tracing::info;

use crate::api::AppState;
use crate::config::AppConfig;

/// Starts the HTTP server and blocks until shutdown (Ctrl+C).
pub async fn start_server(config: AppConfig) -> Result<()> {
    let listen_addr = config.listen_addr;
    let state = Arc::new(AppState::new(config));
    let app = api::build_router(state);

    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    info!(%listen_addr, "assessment service listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("assessment service shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install Ctrl+C handler");
        return;
    }
    info!("shutdown signal received");
}
