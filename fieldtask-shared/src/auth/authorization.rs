/// Task access policy
///
/// Decides what an authenticated user may see:
///
/// | Role | Visible tasks |
/// |---|---|
/// | manager | every task |
/// | technician | tasks with `user_id == self.id` |
///
/// Task creation is always on the requester's own behalf; the owner is taken
/// from the session, never from the request body.
///
/// # Example
///
/// ```
/// use fieldtask_shared::auth::authorization::{task_visibility, Requester};
/// use fieldtask_shared::models::user::UserRole;
///
/// let technician = Requester { id: 7, role: UserRole::Technician };
/// assert_eq!(task_visibility(&technician).user_id, Some(7));
///
/// let manager = Requester { id: 1, role: UserRole::Manager };
/// assert_eq!(task_visibility(&manager).user_id, None);
/// ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use super::middleware::RequestClaims;
use crate::models::task::TaskFilter;
use crate::models::user::UserRole;

/// Error type for authorization checks
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
    /// `sub` claim missing or not a user ID
    #[error("invalid token subject")]
    InvalidSubject,
}

impl IntoResponse for AuthzError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.to_string() }));
        (StatusCode::FORBIDDEN, body).into_response()
    }
}

/// The authenticated user behind a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requester {
    pub id: i64,
    pub role: UserRole,
}

impl Requester {
    /// Builds the requester from session claims
    ///
    /// A missing or unknown `role` is treated as technician so the narrower
    /// view applies.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError::InvalidSubject`] if `sub` is not a user ID
    pub fn from_claims(claims: &RequestClaims) -> Result<Self, AuthzError> {
        let id = claims.subject_id().ok_or(AuthzError::InvalidSubject)?;
        let role = claims
            .role()
            .and_then(|role| role.parse().ok())
            .unwrap_or(UserRole::Technician);

        Ok(Self { id, role })
    }

    pub fn is_manager(&self) -> bool {
        self.role.is_manager()
    }
}

/// Filter restricting a task listing to what `requester` may see
pub fn task_visibility(requester: &Requester) -> TaskFilter {
    if requester.is_manager() {
        TaskFilter::default()
    } else {
        TaskFilter::owned_by(requester.id)
    }
}
