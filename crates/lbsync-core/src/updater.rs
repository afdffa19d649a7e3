//! Signed dynamic updates against the local server
//!
//! Every write in the process goes through [`LocalUpdater::update`], which
//! holds the shared write lock for the duration of one send. Concurrent
//! trackers therefore never race UPDATE messages against the same
//! authoritative server.

use crate::config::SyncSettings;
use crate::error::{Error, Result};
use crate::resolver::absolute_name;
use crate::rrset::RrSet;
use crate::traits::{CredentialSource, UpdateTransport};
use hickory_proto::op::{Message, MessageType, OpCode, Query, ResponseCode};
use hickory_proto::rr::rdata::A;
use hickory_proto::rr::{DNSClass, Name, RData, Record, RecordType};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Build an RFC 2136 update replacing the A rrset of `fqdn` in `zone`.
///
/// Zone section: `zone IN SOA`. Update section: delete the whole A rrset
/// (class ANY, TTL 0, no rdata) followed by one IN A record per address.
/// hickory keeps the zone section in `queries` and the update section in
/// `name_servers`.
pub fn replace_message(zone: &Name, fqdn: &Name, rrset: &RrSet) -> Message {
    let mut zone_section = Query::query(zone.clone(), RecordType::SOA);
    zone_section.set_query_class(DNSClass::IN);

    let mut message = Message::new();
    message
        .set_message_type(MessageType::Query)
        .set_op_code(OpCode::Update)
        .set_recursion_desired(false);
    message.add_query(zone_section);

    let mut delete = Record::with(fqdn.clone(), RecordType::A, 0);
    delete.set_dns_class(DNSClass::ANY);
    message.add_name_server(delete);

    for address in rrset.addresses() {
        let mut record = Record::from_rdata(fqdn.clone(), rrset.ttl(), RData::A(A::from(*address)));
        record.set_dns_class(DNSClass::IN);
        message.add_name_server(record);
    }

    message
}

/// Sends address replacements to the local authoritative server
pub struct LocalUpdater {
    /// Signed update delivery
    transport: Arc<dyn UpdateTransport>,

    /// TSIG key provider, consulted on every update
    credentials: Arc<dyn CredentialSource>,

    /// Process-wide write lock, shared by every tracker
    write_lock: Arc<Mutex<()>>,

    /// Local server
    server: SocketAddr,

    /// Timeout for one update exchange
    timeout: Duration,
}

impl LocalUpdater {
    /// Create an updater that serializes its sends on `write_lock`
    pub fn new(
        transport: Arc<dyn UpdateTransport>,
        credentials: Arc<dyn CredentialSource>,
        write_lock: Arc<Mutex<()>>,
        settings: &SyncSettings,
    ) -> Self {
        Self {
            transport,
            credentials,
            write_lock,
            server: settings.local_server,
            timeout: settings.update_timeout(),
        }
    }

    /// Replace the A records of `fqdn` in `zone` with `rrset`.
    ///
    /// Loads a fresh credential first; a credential failure is returned
    /// without anything being sent. Never retries.
    ///
    /// # Returns
    ///
    /// - `Ok(ResponseCode)`: The server's response code, which may be a failure code
    /// - `Err(Error)`: Invalid names, missing credential, or transport failure
    pub async fn update(&self, zone: &str, fqdn: &str, rrset: &RrSet) -> Result<ResponseCode> {
        let zone_name = absolute_name(zone)?;
        let fqdn_name = absolute_name(fqdn)?;
        let key = self.credentials.load().await?;

        let message = replace_message(&zone_name, &fqdn_name, rrset);
        info!(%fqdn, %zone, %rrset, "Replacing local records");

        let code = {
            let _guard = self.write_lock.lock().await;
            debug!(%fqdn, key = %key.name, "Acquired local write lock");
            self.transport
                .send_update(self.server, message, &key, self.timeout)
                .await
                .map_err(|e| Error::local_update(fqdn, e.to_string()))?
        };

        debug!(%fqdn, rcode = ?code, "Update response");
        Ok(code)
    }
}
