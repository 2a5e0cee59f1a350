//! Admin route handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::app::StatsSnapshot;
use crate::domain::{Consumer, ConsumerId};

use super::AdminState;

/// GET /api/health — liveness probe.
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// GET /api/consumers — every registered consumer with health state.
pub async fn list_consumers(State(admin): State<AdminState>) -> Json<Vec<Consumer>> {
    Json(admin.registry.list_all())
}

/// GET /api/stats — aggregate delivery-outcome counters.
pub async fn stats(State(admin): State<AdminState>) -> Json<StatsSnapshot> {
    Json(admin.stats.snapshot())
}

/// Body for consumer mutation requests.
#[derive(Debug, Deserialize)]
pub struct ConsumerRequest {
    pub endpoint: String,
}

/// POST /api/consumers/suspend — take a consumer out of rotation.
pub async fn suspend_consumer(
    State(admin): State<AdminState>,
    Json(request): Json<ConsumerRequest>,
) -> (StatusCode, Json<serde_json::Value>) {
    let id = ConsumerId::from(request.endpoint.as_str());
    if admin.registry.suspend(&id) {
        (
            StatusCode::OK,
            Json(json!({ "endpoint": request.endpoint, "state": "suspended" })),
        )
    } else {
        unknown_consumer(&request.endpoint)
    }
}

/// POST /api/consumers/reactivate — bring a suspended consumer back with a
/// clean failure count.
pub async fn reactivate_consumer(
    State(admin): State<AdminState>,
    Json(request): Json<ConsumerRequest>,
) -> (StatusCode, Json<serde_json::Value>) {
    let id = ConsumerId::from(request.endpoint.as_str());
    if admin.registry.reactivate(&id) {
        (
            StatusCode::OK,
            Json(json!({ "endpoint": request.endpoint, "state": "active" })),
        )
    } else {
        unknown_consumer(&request.endpoint)
    }
}

fn unknown_consumer(endpoint: &str) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": format!("unknown consumer: {endpoint}") })),
    )
}
