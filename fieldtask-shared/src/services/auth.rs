/// Login service
///
/// Exchanges an `Authorization: Basic` header for a session token:
///
/// ```text
/// decode header → hash password → look user up → sign {sub, username, role}
/// ```

use std::sync::Arc;
use tracing::{error, info};

use super::user::UserService;
use super::{ServiceError, ServiceResult};
use crate::auth::basic::decode_basic_auth;
use crate::auth::jwt::{ClaimMap, ClaimValue, SessionCodec};

#[derive(Debug, Clone)]
pub struct AuthService {
    users: UserService,
    codec: Arc<SessionCodec>,
}

impl AuthService {
    pub fn new(users: UserService, codec: Arc<SessionCodec>) -> Self {
        Self { users, codec }
    }

    /// Authenticates a Basic header and issues a session token
    ///
    /// # Errors
    ///
    /// - [`ServiceError::InvalidAuthorization`] for a malformed header
    /// - [`ServiceError::NotFound`] when the credentials match no user
    /// - [`ServiceError::Internal`] if signing fails
    pub async fn login(&self, authorization: &str) -> ServiceResult<String> {
        let credentials = decode_basic_auth(authorization)?;

        let user = self
            .users
            .get_user_by_username_and_password(&credentials.username, &credentials.password)
            .await?;

        let mut claims = ClaimMap::new();
        claims.insert("username".to_string(), ClaimValue::from(user.username.clone()));
        claims.insert("role".to_string(), ClaimValue::from(user.role));

        let token = self.codec.encrypt(user.id, claims).map_err(|e| {
            error!(trace = "service.auth.login", error = %e, "Failed to sign session token");
            ServiceError::Internal
        })?;

        info!(user_id = user.id, "User logged in");
        Ok(token)
    }
}
