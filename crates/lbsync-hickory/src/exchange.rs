//! UDP query exchange

use crate::run_blocking;
use async_trait::async_trait;
use hickory_client::client::{Client, SyncClient};
use hickory_client::udp::UdpClientConnection;
use hickory_proto::op::Message;
use hickory_proto::rr::{DNSClass, Name, RecordType};
use lbsync_core::{DnsExchange, Error, Result};
use std::net::SocketAddr;
use std::time::Duration;
use tracing::trace;

/// Sends A queries over UDP with hickory's synchronous client
#[derive(Debug, Clone, Default)]
pub struct HickoryExchange;

impl HickoryExchange {
    /// Create an exchange
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DnsExchange for HickoryExchange {
    async fn query(&self, server: SocketAddr, name: &Name, timeout: Duration) -> Result<Message> {
        let name = name.clone();

        run_blocking(timeout, move || {
            let conn = UdpClientConnection::with_timeout(server, timeout)
                .map_err(|e| Error::transport(format!("cannot open UDP socket to {}: {}", server, e)))?;
            let client = SyncClient::new(conn);

            trace!(%server, %name, "Sending A query");
            let response = client
                .query(&name, DNSClass::IN, RecordType::A)
                .map_err(|e| Error::transport(format!("query to {} failed: {}", server, e)))?;

            Ok(Message::clone(&response))
        })
        .await
    }
}
