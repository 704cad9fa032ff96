//! Insight API Server
//!
//! This crate provides the HTTP server for Insight: dataset upload, removal and
//! listing, and query execution over the loaded datasets.
//!
//! # Architecture
//!
//! The API server is built on Axum and Tokio, providing:
//! - REST API for dataset management (`/api/v1/dataset`, `/api/v1/datasets`)
//! - JSON query execution (`/api/v1/query`)
//! - A health check for load balancers (`/health`)
//!
//! # Example
//!
//! ```no_run
//! use api::run_server;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     run_server().await
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod config;
mod routes;
mod state;

pub use config::{Config, DEFAULT_BODY_LIMIT_BYTES};
pub use routes::{ErrorResponse, ResultResponse};
pub use state::AppState;

use anyhow::Result;
use axum::{extract::DefaultBodyLimit, response::IntoResponse, Router};
use shared::storage::InMemoryDatasetStore;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

/// Runs the Insight API server.
///
/// This function initializes the server with configuration from environment variables
/// and starts listening for incoming connections. It handles graceful shutdown on
/// SIGTERM/SIGINT signals.
///
/// # Errors
///
/// Returns an error if:
/// - Configuration cannot be loaded from environment
/// - The server fails to bind to the configured address
/// - A fatal error occurs during operation
pub async fn run_server() -> Result<()> {
    let config = Config::from_env()?;
    run_server_with_config(config).await
}

/// Runs the Insight API server with the provided configuration.
///
/// This is useful for testing or when you want to provide configuration programmatically.
///
/// # Errors
///
/// Returns an error if:
/// - The configured address is invalid
/// - The server fails to bind to the configured address
/// - A fatal error occurs during operation
pub async fn run_server_with_config(config: Config) -> Result<()> {
    let addr = config.socket_addr()?;

    tracing::info!(
        host = %config.host,
        port = %config.port,
        max_result_rows = config.max_result_rows,
        "Insight API server starting"
    );

    let state = AppState::new(
        Arc::new(InMemoryDatasetStore::new()),
        config.query_config(),
    );
    let app = create_router_with_body_limit(state, config.body_limit_bytes);
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(%addr, "Listening for connections");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Creates the main application router with all routes and middleware.
///
/// This function is public to allow testing the router without starting a full server.
pub fn create_router(state: AppState) -> Router {
    create_router_with_body_limit(state, DEFAULT_BODY_LIMIT_BYTES)
}

/// Creates the application router with a custom request body ceiling.
pub fn create_router_with_body_limit(state: AppState, body_limit_bytes: usize) -> Router {
    Router::new()
        .merge(routes::health_routes(state.clone()))
        .merge(routes::dataset_routes(state.clone()))
        .merge(routes::query_routes(state))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::disable())
                .map_response(IntoResponse::into_response)
                .layer(RequestBodyLimitLayer::new(body_limit_bytes)),
        )
}

/// Waits for a shutdown signal (SIGTERM or SIGINT).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
