/// Keyed credential hashing
///
/// Passwords are stored as the hex-encoded HMAC-SHA256 of the plaintext under
/// a server-held key. The hash is deterministic, so a login attempt is checked
/// by hashing the submitted password and comparing it for equality with the
/// stored value.
///
/// # Example
///
/// ```
/// use fieldtask_shared::auth::credentials::CredentialHasher;
///
/// let hasher = CredentialHasher::new(b"key");
/// let hash = hasher.hash("S3cR31");
/// assert_eq!(hash, hasher.hash("S3cR31"));
/// assert_eq!(hash.len(), 64);
/// ```

use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::fmt;

type HmacSha256 = Hmac<Sha256>;

/// HMAC-SHA256 hasher bound to one key
#[derive(Clone)]
pub struct CredentialHasher {
    mac: HmacSha256,
}

impl CredentialHasher {
    /// Creates a hasher for `key`
    pub fn new(key: impl AsRef<[u8]>) -> Self {
        let mac = HmacSha256::new_from_slice(key.as_ref()).expect("HMAC can take key of any size");
        Self { mac }
    }

    /// Hashes `value`, returning 64 lowercase hex characters
    pub fn hash(&self, value: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(value.as_bytes());

        hex::encode(mac.finalize().into_bytes())
    }
}

impl fmt::Debug for CredentialHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialHasher").finish_non_exhaustive()
    }
}
