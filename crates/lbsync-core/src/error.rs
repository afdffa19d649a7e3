//! Error types for the lbsync system
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for lbsync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the lbsync system
#[derive(Error, Debug)]
pub enum Error {
    /// A DNS server timed out or the transport failed
    #[error("DNS transport error: {0}")]
    Transport(String),

    /// A DNS exchange did not complete within its deadline
    #[error("DNS query timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// A response was well-formed but unusable for the query
    #[error("Invalid DNS response: {0}")]
    InvalidResponse(String),

    /// The local server rejected or failed a dynamic update
    #[error("Local update failed for {fqdn}: {message}")]
    LocalUpdate {
        /// Domain being updated
        fqdn: String,
        /// Error message
        message: String,
    },

    /// TSIG key material is missing or unparseable
    #[error("Credential error: {0}")]
    Credential(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed health-check request
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    /// Hostname or zone that is not a valid DNS name
    #[error("Invalid name: {0}")]
    InvalidName(String),

    /// I/O errors (key file, sockets)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file that is not valid INI
    #[error("INI parse error: {0}")]
    Ini(#[from] ini::ParseError),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create an invalid response error
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Create a local update error
    pub fn local_update(fqdn: impl Into<String>, message: impl Into<String>) -> Self {
        Self::LocalUpdate {
            fqdn: fqdn.into(),
            message: message.into(),
        }
    }

    /// Create a credential error
    pub fn credential(msg: impl Into<String>) -> Self {
        Self::Credential(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a malformed request error
    pub fn malformed_request(msg: impl Into<String>) -> Self {
        Self::MalformedRequest(msg.into())
    }

    /// Create an invalid name error
    pub fn invalid_name(msg: impl Into<String>) -> Self {
        Self::InvalidName(msg.into())
    }

    /// Whether the error came from the network path rather than from the
    /// content of a response
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Timeout(_) | Self::Io(_))
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
