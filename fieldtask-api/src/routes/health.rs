/// Health check endpoint
///
/// # Endpoint
///
/// ```text
/// GET /api/healthcheck
/// ```
///
/// # Response
///
/// `200 {"status":"up"}` while the store answers, `503 {"status":"down"}`
/// otherwise.

use crate::app::AppState;
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `up` or `down`
    pub status: String,
}

pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (code, status) = if state.health.check().await {
        (StatusCode::OK, "up")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "down")
    };

    (
        code,
        Json(HealthResponse {
            status: status.to_string(),
        }),
    )
}
