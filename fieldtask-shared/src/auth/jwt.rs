/// Session token issuance and validation
///
/// Session tokens are JWTs signed with a symmetric key (HS256). A token
/// carries the standard `sub`, `iat` and `exp` claims plus any caller
/// supplied claims such as `username` and `role`.
///
/// # Claim merge order
///
/// [`SessionCodec::encrypt`] writes `iat`, `exp` and `sub` first and then
/// every caller claim, so a caller claim with a reserved name replaces the
/// generated value.
///
/// # Validation
///
/// - Only the HMAC family (HS256/HS384/HS512) is accepted; anything else
///   fails with [`TokenError::UnexpectedSigningMethod`]
/// - `exp` is checked without leeway. A token whose `exp` is not strictly in
///   the future fails with [`TokenError::Expired`], so a codec configured
///   with a zero lifetime issues tokens that are already expired
/// - Every other failure is [`TokenError::Invalid`]
///
/// # Example
///
/// ```
/// use chrono::Duration;
/// use fieldtask_shared::auth::jwt::{ClaimMap, SessionCodec};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let codec = SessionCodec::new("your-secret-key-at-least-32-bytes", Duration::minutes(15));
///
/// let mut claims = ClaimMap::new();
/// claims.insert("role".to_string(), "manager".into());
///
/// let token = codec.encrypt(1, claims)?;
/// let decoded = codec.decrypt(&token)?;
/// assert_eq!(decoded["sub"].to_string(), "1");
/// assert_eq!(decoded["role"].to_string(), "manager");
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

use crate::models::user::UserRole;

/// Error type for session token operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// `exp` has passed
    #[error("token is expired")]
    Expired,

    /// Bad signature, malformed structure or unreadable claims
    #[error("invalid token")]
    Invalid,

    /// Signed with an algorithm outside the HMAC family
    #[error("unexpected signing method: {0}")]
    UnexpectedSigningMethod(String),

    /// Failed to sign a new token
    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// One claim value
///
/// Numbers decode as `f64` whatever their original type, following the JSON
/// wire encoding. Timestamps are only ever constructed locally; they encode
/// as integer Unix seconds and decode back as [`ClaimValue::Number`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClaimValue {
    Text(String),
    Number(f64),
    Timestamp(#[serde(with = "chrono::serde::ts_seconds")] DateTime<Utc>),
}

impl ClaimValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ClaimValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view; timestamps yield their Unix seconds
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ClaimValue::Number(n) => Some(*n),
            ClaimValue::Timestamp(ts) => Some(ts.timestamp() as f64),
            ClaimValue::Text(_) => None,
        }
    }
}

impl fmt::Display for ClaimValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClaimValue::Text(s) => f.write_str(s),
            ClaimValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            ClaimValue::Number(n) => write!(f, "{n}"),
            ClaimValue::Timestamp(ts) => write!(f, "{}", ts.timestamp()),
        }
    }
}

impl From<&str> for ClaimValue {
    fn from(value: &str) -> Self {
        ClaimValue::Text(value.to_string())
    }
}

impl From<String> for ClaimValue {
    fn from(value: String) -> Self {
        ClaimValue::Text(value)
    }
}

impl From<i64> for ClaimValue {
    fn from(value: i64) -> Self {
        ClaimValue::Number(value as f64)
    }
}

impl From<f64> for ClaimValue {
    fn from(value: f64) -> Self {
        ClaimValue::Number(value)
    }
}

impl From<DateTime<Utc>> for ClaimValue {
    fn from(value: DateTime<Utc>) -> Self {
        ClaimValue::Timestamp(value)
    }
}

impl From<UserRole> for ClaimValue {
    fn from(value: UserRole) -> Self {
        ClaimValue::Text(value.as_str().to_string())
    }
}

/// Full claim set of a session token
pub type ClaimMap = BTreeMap<String, ClaimValue>;

/// Signs and verifies session tokens with one symmetric key
#[derive(Clone)]
pub struct SessionCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expires_in: Duration,
}

impl SessionCodec {
    /// Creates a codec issuing tokens valid for `expires_in`
    pub fn new(secret: &str, expires_in: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expires_in,
        }
    }

    /// Creates a codec with the lifetime given in milliseconds
    pub fn from_millis(secret: &str, expires_in_ms: i64) -> Self {
        Self::new(secret, Duration::milliseconds(expires_in_ms))
    }

    pub fn expires_in(&self) -> Duration {
        self.expires_in
    }

    /// Issues a token for `subject_id` carrying `claims`
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Signing`] if the expiry is out of range or the
    /// token cannot be encoded
    pub fn encrypt(&self, subject_id: i64, claims: ClaimMap) -> Result<String, TokenError> {
        let now = Utc::now();
        let exp = now
            .checked_add_signed(self.expires_in)
            .ok_or_else(|| TokenError::Signing("expiry out of range".to_string()))?;

        let mut full = ClaimMap::new();
        full.insert("iat".to_string(), now.into());
        full.insert("exp".to_string(), exp.into());
        full.insert("sub".to_string(), subject_id.into());
        full.extend(claims);

        encode(&Header::new(Algorithm::HS256), &full, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verifies `token` and returns its claims
    ///
    /// # Errors
    ///
    /// - [`TokenError::UnexpectedSigningMethod`] for non-HMAC algorithms
    /// - [`TokenError::Expired`] when `exp` is not in the future
    /// - [`TokenError::Invalid`] for anything else
    pub fn decrypt(&self, token: &str) -> Result<ClaimMap, TokenError> {
        let header = decode_header(token).map_err(|e| {
            debug!(trace = "auth.jwt.decrypt", error = %e, "Malformed token header");
            TokenError::Invalid
        })?;

        if !matches!(header.alg, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512) {
            return Err(TokenError::UnexpectedSigningMethod(format!("{:?}", header.alg)));
        }

        let mut validation = Validation::new(header.alg);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.validate_aud = false;

        let data = decode::<ClaimMap>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => {
                    debug!(trace = "auth.jwt.decrypt", error = %e, "Token validation failed");
                    TokenError::Invalid
                }
            }
        })?;

        let claims = data.claims;
        let exp = claims
            .get("exp")
            .and_then(ClaimValue::as_f64)
            .ok_or(TokenError::Invalid)?;
        if exp <= Utc::now().timestamp() as f64 {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}

impl fmt::Debug for SessionCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCodec")
            .field("expires_in", &self.expires_in)
            .finish_non_exhaustive()
    }
}
