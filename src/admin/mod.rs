//! Administrative HTTP API.
//!
//! Exposes the operational surface: list consumers, suspend, reactivate,
//! and aggregate delivery stats. This is the only path for bringing a
//! suspended consumer back into rotation.

mod routes;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::app::{AppState, Shutdown};
use crate::error::{Error, Result};
use crate::registry::ConsumerRegistry;

/// Shared state handed to every admin route handler.
#[derive(Clone)]
pub struct AdminState {
    pub registry: Arc<ConsumerRegistry>,
    pub stats: Arc<AppState>,
}

/// Build the axum Router with all admin routes.
/// Used by `serve()` and available for integration testing.
pub fn build_router(registry: Arc<ConsumerRegistry>, stats: Arc<AppState>) -> Router {
    let state = AdminState { registry, stats };

    Router::new()
        .route("/api/health", get(routes::health))
        .route("/api/consumers", get(routes::list_consumers))
        .route("/api/consumers/suspend", post(routes::suspend_consumer))
        .route(
            "/api/consumers/reactivate",
            post(routes::reactivate_consumer),
        )
        .route("/api/stats", get(routes::stats))
        .with_state(state)
}

/// Serve the admin API until shutdown is signalled.
pub async fn serve(
    bind: &str,
    registry: Arc<ConsumerRegistry>,
    stats: Arc<AppState>,
    shutdown: Shutdown,
) -> Result<()> {
    let router = build_router(registry, stats);
    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!(bind, "Admin API listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| Error::Admin(e.to_string()))
}
