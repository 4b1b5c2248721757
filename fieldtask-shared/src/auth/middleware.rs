/// Request gates for Axum
///
/// Two independent gates protect the API:
///
/// - **Bearer gate**: validates the session token in `Authorization: Bearer
///   <token>` and stores its claims, stringified, as [`RequestClaims`] in the
///   request extensions
/// - **Manager gate**: lets the request through only when the `role` claim
///   stored by the bearer gate is exactly `manager`
///
/// The manager gate depends on the bearer gate, so the bearer gate must be the
/// outer layer. With Axum that means adding it last.
///
/// # Rejections
///
/// | Cause | Status | Body |
/// |---|---|---|
/// | Header is not `bearer <token>` | 400 | `{"error":"invalid authorization"}` |
/// | Token rejected by the codec | 403 | `{"error":"<token error>"}` |
/// | Role is not `manager` | 401 | `{"error":"unauthorized user role"}` |
///
/// # Example
///
/// ```no_run
/// use axum::{middleware, routing::post, Extension, Router};
/// use chrono::Duration;
/// use fieldtask_shared::auth::jwt::SessionCodec;
/// use fieldtask_shared::auth::middleware::{
///     create_bearer_middleware, require_manager_middleware, RequestClaims,
/// };
/// use std::sync::Arc;
///
/// async fn handler(Extension(claims): Extension<RequestClaims>) -> String {
///     format!("Hello, user {}!", claims.get("sub").unwrap_or_default())
/// }
///
/// let codec = Arc::new(SessionCodec::new("your-jwt-secret", Duration::minutes(15)));
/// let app: Router = Router::new()
///     .route("/users", post(handler))
///     .layer(middleware::from_fn(require_manager_middleware))
///     .layer(middleware::from_fn(create_bearer_middleware(codec)));
/// ```

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use super::jwt::{ClaimMap, SessionCodec, TokenError};
use crate::models::user::UserRole;

/// Claims of the authenticated session, stringified
///
/// Inserted into request extensions by the bearer gate. Numeric claims are
/// rendered without a fractional part when they are integral, so `sub` reads
/// as `"1"` rather than `"1.0"`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestClaims {
    params: BTreeMap<String, String>,
}

impl RequestClaims {
    pub fn from_claims(claims: &ClaimMap) -> Self {
        Self {
            params: claims
                .iter()
                .map(|(key, value)| (key.clone(), value.to_string()))
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.insert(key.into(), value.into());
    }

    /// The `sub` claim parsed as a user ID
    pub fn subject_id(&self) -> Option<i64> {
        self.get("sub")?.parse().ok()
    }

    /// The raw `role` claim
    pub fn role(&self) -> Option<&str> {
        self.get("role")
    }
}

/// Error type for the request gates
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Missing or malformed bearer header
    #[error("invalid authorization")]
    InvalidAuthorization,

    /// Session token rejected
    #[error(transparent)]
    Token(#[from] TokenError),

    /// Role does not grant access
    #[error("unauthorized user role")]
    UnauthorizedRole,
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidAuthorization => StatusCode::BAD_REQUEST,
            AuthError::Token(_) => StatusCode::FORBIDDEN,
            AuthError::UnauthorizedRole => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.to_string() }));
        (self.status_code(), body).into_response()
    }
}

/// Extracts the token from a `bearer <token>` header value
fn parse_bearer(value: &str) -> Result<&str, AuthError> {
    let parts: Vec<&str> = value.split(' ').collect();
    match parts.as_slice() {
        [scheme, token] if scheme.eq_ignore_ascii_case("bearer") => Ok(*token),
        _ => Err(AuthError::InvalidAuthorization),
    }
}

/// Bearer token middleware
///
/// Validates the session token and inserts [`RequestClaims`] before calling
/// the next handler. A missing header is treated like an empty one.
///
/// # Errors
///
/// - [`AuthError::InvalidAuthorization`] (400) if the header is not
///   `bearer <token>`
/// - [`AuthError::Token`] (403) if the codec rejects the token
pub async fn bearer_auth_middleware(
    codec: Arc<SessionCodec>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let token = parse_bearer(auth_header)?;
    let claims = codec.decrypt(token)?;

    req.extensions_mut().insert(RequestClaims::from_claims(&claims));

    Ok(next.run(req).await)
}

/// Manager-only middleware
///
/// # Errors
///
/// Returns [`AuthError::UnauthorizedRole`] (401) unless the request carries
/// a `role` claim equal to `manager`
pub async fn require_manager_middleware(req: Request, next: Next) -> Result<Response, AuthError> {
    let is_manager = req
        .extensions()
        .get::<RequestClaims>()
        .and_then(RequestClaims::role)
        == Some(UserRole::Manager.as_str());

    if !is_manager {
        return Err(AuthError::UnauthorizedRole);
    }

    Ok(next.run(req).await)
}

/// Boxed middleware future
pub type MiddlewareFuture = Pin<Box<dyn Future<Output = Result<Response, AuthError>> + Send>>;

/// Creates a bearer middleware closure
///
/// Captures the codec so the closure can be passed to
/// `axum::middleware::from_fn`.
pub fn create_bearer_middleware(
    codec: Arc<SessionCodec>,
) -> impl Fn(Request, Next) -> MiddlewareFuture + Clone {
    move |req, next| {
        let codec = codec.clone();
        Box::pin(bearer_auth_middleware(codec, req, next))
    }
}
