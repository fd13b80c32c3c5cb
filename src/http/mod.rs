//! HTTP upload endpoint
//!
//! - POST /upload-video - Store a multipart clip on disk
//! - GET /health - Health check

mod error;
mod handlers;
mod routes;
mod state;

pub use error::ServerError;
pub use routes::create_router;
pub use state::AppState;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use tracing::info;

/// Serve the router on `addr` until Ctrl+C
pub async fn serve(state: AppState, addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Upload endpoint listening on http://{}", listener.local_addr()?);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Received Ctrl+C, shutting down");
        })
        .await
        .context("HTTP server failed")
}
