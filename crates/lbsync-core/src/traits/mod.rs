//! Core traits for the lbsync system
//!
//! These are the I/O seams of the synchronization engine. The engine only
//! decides *what* to ask and *when*; implementations decide *how* bytes
//! reach a DNS server.
//!
//! - [`DnsExchange`]: Send one address query to one server
//! - [`UpdateTransport`]: Send one signed dynamic update to one server
//! - [`CredentialSource`]: Supply TSIG key material per update
//! - [`HostLookup`]: Resolve a hostname through a recursive resolver

pub mod credential_source;
pub mod dns_exchange;
pub mod host_lookup;
pub mod update_transport;

pub use credential_source::{CredentialSource, TsigKey};
pub use dns_exchange::DnsExchange;
pub use host_lookup::HostLookup;
pub use update_transport::UpdateTransport;
