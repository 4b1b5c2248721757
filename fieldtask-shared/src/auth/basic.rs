/// HTTP Basic authorization decoding
///
/// Parses the raw value of an `Authorization: Basic <base64(user:pass)>`
/// header into its two credentials.
///
/// The scheme is matched case-insensitively. A payload that is not valid
/// base64 is treated as empty rather than rejected outright; it then fails
/// the `user:pass` split like any other malformed payload.
///
/// # Example
///
/// ```
/// use fieldtask_shared::auth::basic::decode_basic_auth;
///
/// let creds = decode_basic_auth("Basic dXNlcm5hbWU6cGFzc3dvcmQ=").unwrap();
/// assert_eq!(creds.username, "username");
/// assert_eq!(creds.password, "password");
/// ```

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

/// Basic authorization error
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BasicAuthError {
    #[error("invalid authorization")]
    InvalidAuthorization,
}

/// Credentials extracted from a Basic header
#[derive(Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    pub username: String,

    /// Plaintext password as sent by the client
    pub password: String,
}

impl std::fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Decodes a Basic authorization header value
///
/// # Errors
///
/// Returns [`BasicAuthError::InvalidAuthorization`] when the value is not
/// exactly `<scheme> <payload>` with a `basic` scheme, or when the decoded
/// payload does not contain exactly one `:`
pub fn decode_basic_auth(header: &str) -> Result<BasicCredentials, BasicAuthError> {
    let parts: Vec<&str> = header.split(' ').collect();
    let [scheme, payload] = parts.as_slice() else {
        return Err(BasicAuthError::InvalidAuthorization);
    };

    if !scheme.eq_ignore_ascii_case("basic") {
        return Err(BasicAuthError::InvalidAuthorization);
    }

    let decoded = BASE64.decode(payload).unwrap_or_default();
    let decoded = String::from_utf8_lossy(&decoded);

    let credentials: Vec<&str> = decoded.split(':').collect();
    let [username, password] = credentials.as_slice() else {
        return Err(BasicAuthError::InvalidAuthorization);
    };

    Ok(BasicCredentials {
        username: (*username).to_string(),
        password: (*password).to_string(),
    })
}
