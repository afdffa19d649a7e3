//! Address resolution for the synchronization engine
//!
//! - [`RemoteResolver`]: asks an ordered list of independent servers for a
//!   load balancer's addresses and keeps the first structurally valid answer
//! - [`LocalResolver`]: asks the local authoritative server what it
//!   currently publishes for a domain

pub mod local;
pub mod remote;

pub use local::LocalResolver;
pub use remote::{Attempt, RemoteResolver, validate_response};

use crate::error::{Error, Result};
use hickory_proto::rr::Name;

/// Parse `host` as an absolute DNS name, appending the root label if needed
pub fn absolute_name(host: &str) -> Result<Name> {
    let host = host.trim();
    let text = if host.ends_with('.') {
        host.to_string()
    } else {
        format!("{}.", host)
    };
    Name::from_ascii(&text).map_err(|e| Error::invalid_name(format!("{}: {}", host, e)))
}
