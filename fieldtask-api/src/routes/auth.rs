/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /api/auth/login` - Exchange Basic credentials for a session token

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::State,
    http::{header, HeaderMap},
    Json,
};
use fieldtask_shared::services::ServiceError;
use serde::{Deserialize, Serialize};

/// Login response
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Signed session token
    pub access_token: String,
}

/// Login
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/login
/// Authorization: Basic <base64(username:password)>
/// ```
///
/// # Response
///
/// ```json
/// { "access_token": "eyJ..." }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Missing or malformed Basic header
/// - `403 Forbidden`: Unknown username or wrong password
/// - `500 Internal Server Error`: Server error
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<LoginResponse>> {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let access_token = state.auth.login(authorization).await.map_err(|e| match e {
        // Unknown credentials are a rejected login, not a missing resource
        ServiceError::NotFound(msg) => ApiError::Forbidden(msg),
        other => ApiError::from(other),
    })?;

    Ok(Json(LoginResponse { access_token }))
}
