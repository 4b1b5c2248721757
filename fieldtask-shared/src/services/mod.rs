/// Business services
///
/// Services sit between the HTTP handlers and the stores. Each one owns the
/// collaborators it needs behind `Arc<dyn Trait>` so the same service runs
/// over PostgreSQL in production and over [`crate::store::memory::MemoryStore`]
/// in tests.
///
/// # Error logging
///
/// A failure is logged once, where it is detected, with a `trace` field
/// naming the operation. Expected client outcomes (`NotFound`,
/// `ForeignKeyConstraint`, `Conflict`) are not logged as errors.
///
/// # Modules
///
/// - `user`: User creation and lookups
/// - `auth`: Basic-auth login issuing session tokens
/// - `task`: Task creation and role-scoped listing
/// - `notification`: Manager fan-out after a task is saved
/// - `health`: Store liveness

pub mod auth;
pub mod health;
pub mod notification;
pub mod task;
pub mod user;

use tracing::error;

use crate::auth::basic::BasicAuthError;
use crate::auth::jwt::TokenError;
use crate::store::StoreError;

/// Error type shared by all services
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Malformed credentials header
    #[error("invalid authorization")]
    InvalidAuthorization,

    /// Lookup miss; the message is safe to show
    #[error("{0}")]
    NotFound(String),

    /// Referenced record does not exist; the message is safe to show
    #[error("{0}")]
    ForeignKeyConstraint(String),

    /// Unique constraint violation; the message is safe to show
    #[error("{0}")]
    Conflict(String),

    /// Session token failure
    #[error(transparent)]
    Token(#[from] TokenError),

    /// Anything else; details were logged where it happened
    #[error("internal server error")]
    Internal,
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<BasicAuthError> for ServiceError {
    fn from(err: BasicAuthError) -> Self {
        match err {
            BasicAuthError::InvalidAuthorization => ServiceError::InvalidAuthorization,
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => ServiceError::NotFound(msg),
            StoreError::ForeignKeyConstraint(msg) => ServiceError::ForeignKeyConstraint(msg),
            StoreError::Conflict(msg) => ServiceError::Conflict(msg),
            StoreError::Database(_) | StoreError::Unavailable(_) => ServiceError::Internal,
        }
    }
}

impl ServiceError {
    /// Converts a store error, logging it first unless it is an expected
    /// client outcome
    pub(crate) fn from_store(trace: &'static str, err: StoreError) -> Self {
        match &err {
            StoreError::NotFound(_) | StoreError::ForeignKeyConstraint(_) | StoreError::Conflict(_) => {}
            StoreError::Database(_) | StoreError::Unavailable(_) => {
                error!(trace, error = %err, "Store operation failed");
            }
        }

        err.into()
    }
}
