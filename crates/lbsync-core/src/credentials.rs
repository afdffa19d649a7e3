//! TSIG key file credentials
//!
//! BIND writes a session key when a primary zone uses `update-policy local`:
//!
//! ```text
//! key "local-ddns" {
//!     algorithm hmac-sha256;
//!     secret "base64 encoded secret";
//! };
//! ```
//!
//! The file is re-read on every [`CredentialSource::load`] call.

use crate::error::{Error, Result};
use crate::traits::{CredentialSource, TsigKey, credential_source::DEFAULT_TSIG_ALGORITHM};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use std::path::PathBuf;
use tracing::debug;

/// Default location of the BIND session key
pub const DEFAULT_KEY_FILE: &str = "/var/run/named/session.key";

/// Credential source backed by a BIND key file
#[derive(Debug, Clone)]
pub struct KeyFileCredentials {
    path: PathBuf,
}

impl KeyFileCredentials {
    /// Create a source reading `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for KeyFileCredentials {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_FILE)
    }
}

#[async_trait]
impl CredentialSource for KeyFileCredentials {
    async fn load(&self) -> Result<TsigKey> {
        let contents = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            Error::credential(format!("cannot read {}: {}", self.path.display(), e))
        })?;
        let key = parse_key_file(&contents)?;
        debug!(key = %key.name, algorithm = %key.algorithm, "Loaded TSIG key");
        Ok(key)
    }
}

/// Extract the key name, algorithm and secret from key file contents.
///
/// Statements are matched line by line; when a statement repeats, the last
/// occurrence wins.
pub fn parse_key_file(contents: &str) -> Result<TsigKey> {
    let mut name = None;
    let mut algorithm = None;
    let mut secret = None;

    for line in contents.lines() {
        let line = line.trim();

        if let Some(rest) = line.strip_prefix("key")
            && let Some((value, after)) = quoted(rest)
            && after.trim_start().starts_with('{')
            && !value.is_empty()
        {
            name = Some(value.to_string());
        }

        if let Some(pos) = line.find("algorithm") {
            let rest = line[pos + "algorithm".len()..].trim_start();
            if let Some(end) = rest.find(';') {
                let value = rest[..end].trim();
                if !value.is_empty() {
                    algorithm = Some(value.to_ascii_lowercase());
                }
            }
        }

        if let Some(pos) = line.find("secret")
            && let Some((value, after)) = quoted(&line[pos + "secret".len()..])
            && after.trim_start().starts_with(';')
        {
            secret = Some(value.to_string());
        }
    }

    let name = name.ok_or_else(|| Error::credential("key file has no key name"))?;
    let secret = secret.ok_or_else(|| Error::credential("key file has no secret"))?;
    let secret = BASE64
        .decode(secret.as_bytes())
        .map_err(|e| Error::credential(format!("secret for key {} is not base64: {}", name, e)))?;
    if secret.is_empty() {
        return Err(Error::credential(format!("secret for key {} is empty", name)));
    }

    Ok(TsigKey {
        name,
        algorithm: algorithm.unwrap_or_else(|| DEFAULT_TSIG_ALGORITHM.to_string()),
        secret,
    })
}

/// The first double-quoted string in `s` and whatever follows its closing quote
fn quoted(s: &str) -> Option<(&str, &str)> {
    let start = s.find('"')? + 1;
    let len = s[start..].find('"')?;
    Some((&s[start..start + len], &s[start + len + 1..]))
}
