/// Authentication and authorization primitives
///
/// # Modules
///
/// - [`credentials`]: Keyed HMAC-SHA256 password hashing
/// - [`basic`]: `Authorization: Basic` header decoding for login
/// - [`jwt`]: Session token issuance and validation
/// - [`middleware`]: Bearer and manager request gates for Axum
/// - [`authorization`]: Task visibility per role
///
/// # Example
///
/// ```
/// use chrono::Duration;
/// use fieldtask_shared::auth::basic::decode_basic_auth;
/// use fieldtask_shared::auth::credentials::CredentialHasher;
/// use fieldtask_shared::auth::jwt::{ClaimMap, SessionCodec};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let creds = decode_basic_auth("Basic dXNlcm5hbWU6cGFzc3dvcmQ=")?;
/// let hash = CredentialHasher::new("hash-key").hash(&creds.password);
///
/// let codec = SessionCodec::new("your-secret-key-at-least-32-bytes", Duration::minutes(15));
/// let token = codec.encrypt(1, ClaimMap::new())?;
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod basic;
pub mod credentials;
pub mod jwt;
pub mod middleware;
