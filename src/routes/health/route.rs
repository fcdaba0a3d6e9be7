use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub success: bool,
    #[schema(example = "ok")]
    pub status: String,
    /// `connected` once the record store has been reached, else `fallback`
    #[schema(example = "connected")]
    pub record_store: String,
    pub pending_sync: usize,
}

pub fn create_route() -> Router<AppState> {
    Router::new().route("/api/health", get(health))
}

/// Liveness check
#[utoipa::path(
    get,
    path = "/api/health",
    responses((status = 200, description = "Service is up", body = HealthResponse)),
    tag = "Health"
)]
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let record_store = if state.store.is_initialized() {
        "connected"
    } else {
        "fallback"
    };

    (
        StatusCode::OK,
        Json(HealthResponse {
            success: true,
            status: "ok".to_string(),
            record_store: record_store.to_string(),
            pending_sync: state.sync_queue.len(),
        }),
    )
}
