//! TSIG-signed update delivery

use crate::run_blocking;
use crate::tsig::tsig_signer;
use async_trait::async_trait;
use hickory_client::client::{Client, SyncClient};
use hickory_client::udp::UdpClientConnection;
use hickory_proto::op::{Message, ResponseCode};
use hickory_proto::xfer::{DnsRequest, DnsRequestOptions};
use lbsync_core::{Error, Result, TsigKey, UpdateTransport};
use std::net::SocketAddr;
use std::time::Duration;
use tracing::trace;

/// Signs update messages with the supplied key and sends them over UDP
#[derive(Debug, Clone, Default)]
pub struct HickoryUpdateTransport;

impl HickoryUpdateTransport {
    /// Create a transport
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl UpdateTransport for HickoryUpdateTransport {
    async fn send_update(
        &self,
        server: SocketAddr,
        update: Message,
        key: &TsigKey,
        timeout: Duration,
    ) -> Result<ResponseCode> {
        let signer = tsig_signer(key)?;

        run_blocking(timeout, move || {
            let conn = UdpClientConnection::with_timeout(server, timeout)
                .map_err(|e| Error::transport(format!("cannot open UDP socket to {}: {}", server, e)))?;
            let client = SyncClient::with_tsigner(conn, signer);

            trace!(%server, records = update.name_servers().len(), "Sending signed update");
            let request = DnsRequest::new(update, DnsRequestOptions::default());

            let response = client
                .send(request)
                .into_iter()
                .next()
                .ok_or_else(|| Error::transport(format!("no response from {}", server)))?
                .map_err(|e| Error::transport(format!("update to {} failed: {}", server, e)))?;

            Ok(response.response_code())
        })
        .await
    }
}
