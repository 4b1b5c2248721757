/// User management endpoints
///
/// # Endpoints
///
/// - `POST /api/users` - Create a user (managers only)

use crate::{
    app::AppState,
    error::ApiResult,
    routes::TIMESTAMP_FORMAT,
    validation::validate_with,
};
use axum::{extract::State, http::StatusCode, Json};
use fieldtask_shared::{
    models::user::{User, UserRole},
    services::user::CreateUser,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Create user request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 4, max = 20, message = "username must be 4-20 characters"))]
    pub username: String,

    #[validate(email(message = "invalid email format"))]
    pub email: String,

    #[validate(length(min = 4, max = 20, message = "password must be 4-20 characters"))]
    pub password: String,

    /// `manager` or `technician`; technician when omitted
    #[serde(default)]
    pub role: Option<String>,
}

/// User as returned to clients
#[derive(Debug, Serialize, Deserialize)]
pub struct UserDto {
    pub id: i64,
    pub created_at: String,
    pub updated_at: String,
    pub email: String,
    pub username: String,
    pub role: UserRole,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            created_at: user.created_at.format(TIMESTAMP_FORMAT).to_string(),
            updated_at: user.updated_at.format(TIMESTAMP_FORMAT).to_string(),
            email: user.email,
            username: user.username,
            role: user.role,
        }
    }
}

/// Single user response
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub data: UserDto,
}

/// Create a user
///
/// # Endpoint
///
/// ```text
/// POST /api/users
/// Authorization: Bearer <manager token>
/// Content-Type: application/json
///
/// {
///   "username": "jdoe",
///   "email": "jdoe@example.com",
///   "password": "secret",
///   "role": "technician"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `401 Unauthorized`: Caller is not a manager
/// - `403 Forbidden`: Session token rejected
/// - `409 Conflict`: Username already exists
pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    let mut role = None;
    validate_with(&req, |errors| match state.role_rule.check(req.role.as_deref()) {
        Ok(parsed) => role = parsed,
        Err(e) => errors.add("role", e),
    })?;

    let user = state
        .users
        .create_user(CreateUser {
            username: req.username,
            email: req.email,
            password: req.password,
            role,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            data: UserDto::from(user),
        }),
    ))
}
