// # Update Transport Trait
//
// Defines the interface for delivering an RFC 2136 dynamic update message,
// signed with a TSIG key, to the local authoritative server.
//
// ## Implementations
//
// - UDP via hickory-client with a TSIG signer: `lbsync-hickory` crate

use crate::traits::TsigKey;
use async_trait::async_trait;
use hickory_proto::op::{Message, ResponseCode};
use std::net::SocketAddr;
use std::time::Duration;

/// Trait for signed dynamic update delivery
///
/// # Contract
///
/// - The message is signed with `key` and sent exactly once.
/// - The server's response code is returned as-is, including failures
///   such as `REFUSED` or `NOTAUTH`; the caller decides what they mean.
/// - Serialization of concurrent writers is owned by
///   [`crate::updater::LocalUpdater`], never by the transport.
#[async_trait]
pub trait UpdateTransport: Send + Sync {
    /// Sign `update` with `key` and send it to `server`
    async fn send_update(
        &self,
        server: SocketAddr,
        update: Message,
        key: &TsigKey,
        timeout: Duration,
    ) -> Result<ResponseCode, crate::Error>;
}
