// # DNS Exchange Trait
//
// Defines the interface for sending a single address query to a single
// DNS server and returning the raw response.
//
// ## Implementations
//
// - UDP via hickory-client: `lbsync-hickory` crate
//
// ## Usage
//
// ```rust,ignore
// use lbsync_core::DnsExchange;
//
// let name = lbsync_core::resolver::absolute_name("lb.example.net")?;
// let response = exchange
//     .query("198.51.100.1:53".parse()?, &name, Duration::from_secs(5))
//     .await?;
// ```

use async_trait::async_trait;
use hickory_proto::op::Message;
use hickory_proto::rr::Name;
use std::net::SocketAddr;
use std::time::Duration;

/// Trait for one-shot DNS query implementations
///
/// # Contract
///
/// - Exactly one query is sent per call, for record type A, class IN.
/// - The call completes within `timeout`; expiry is reported as
///   [`crate::Error::Timeout`].
/// - The response is returned as received. Judging whether the answer is
///   usable belongs to the resolvers, not to the exchange.
/// - No retries and no fallback to other servers.
#[async_trait]
pub trait DnsExchange: Send + Sync {
    /// Query `server` for the A records of `name`
    ///
    /// # Returns
    ///
    /// - `Ok(Message)`: The server's response, whatever its content
    /// - `Err(Error)`: Timeout or transport failure
    async fn query(
        &self,
        server: SocketAddr,
        name: &Name,
        timeout: Duration,
    ) -> Result<Message, crate::Error>;
}
