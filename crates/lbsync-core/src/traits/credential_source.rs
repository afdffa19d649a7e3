// # Credential Source Trait
//
// Defines the interface for obtaining the TSIG key that authenticates
// dynamic updates. The key is requested again for every update so a
// rotated key file takes effect without a restart.
//
// ## Implementations
//
// - BIND key file (`key "<name>" { algorithm <alg>; secret "<b64>"; };`):
//   [`crate::credentials::KeyFileCredentials`]

use async_trait::async_trait;
use std::fmt;

/// Default TSIG algorithm when a key file does not name one
pub const DEFAULT_TSIG_ALGORITHM: &str = "hmac-sha256";

/// TSIG key material
///
/// The Debug implementation intentionally does NOT expose the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct TsigKey {
    /// Key name, as known to the server
    pub name: String,
    /// Algorithm name (e.g. "hmac-sha256")
    pub algorithm: String,
    /// Decoded shared secret
    /// ⚠️ NEVER log this value
    pub secret: Vec<u8>,
}

impl TsigKey {
    /// Create a key with the default algorithm
    pub fn new(name: impl Into<String>, secret: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            algorithm: DEFAULT_TSIG_ALGORITHM.to_string(),
            secret: secret.into(),
        }
    }

    /// Set the algorithm
    pub fn with_algorithm(mut self, algorithm: impl Into<String>) -> Self {
        self.algorithm = algorithm.into();
        self
    }
}

impl fmt::Debug for TsigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TsigKey")
            .field("name", &self.name)
            .field("algorithm", &self.algorithm)
            .field("secret", &"<REDACTED>")
            .finish()
    }
}

/// Trait for TSIG credential providers
///
/// Implementations must not cache key material across calls.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    /// Load the current key
    ///
    /// # Returns
    ///
    /// - `Ok(TsigKey)`: Name and secret were both found
    /// - `Err(Error::Credential)`: Key material missing or unparseable
    async fn load(&self) -> Result<TsigKey, crate::Error>;
}
