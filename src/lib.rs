//! ShareIt library: an item-sharing backend split into a validating
//! gateway and a persistence-backed server.
//!
//! The server exposes users, items, bookings, item requests and comments
//! over JSON/HTTP on top of a SQLite store.  The gateway validates the
//! same requests and forwards the valid ones to the server.

use std::sync::Arc;

pub mod config;
pub mod dto;
pub mod errors;
pub mod extract;
pub mod gateway;
pub mod handlers;
pub mod logging;
pub mod metrics;
pub mod model;
pub mod server;
pub mod store;

use crate::config::Config;
use crate::store::repository::ShareItStore;

/// Shared server state passed to all handlers via `axum::extract::State`.
pub struct AppState {
    /// Loaded configuration.
    pub config: Config,
    /// Persistence backend.
    pub store: Arc<dyn ShareItStore>,
}

/// Wait for SIGTERM or SIGINT (Ctrl+C), then return to trigger graceful
/// shutdown.  Shared by both binaries.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, shutting down");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down");
        },
    }
}
