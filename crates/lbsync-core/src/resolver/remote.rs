//! Remote resolution with validation and ordered fallback
//!
//! Edge and anycast DNS can answer differently depending on which server
//! is asked, so the resolver walks the configured servers in order until
//! one returns an answer with a trustworthy shape.
//!
//! ## Per-server outcome
//!
//! ```text
//! query(server) ──┬── Ok(valid answer) ──▶ Attempt::Valid(rrset)   → stop
//!                 ├── Ok(bad shape)    ──▶ Attempt::Invalid        → next server
//!                 ├── Err(unusable)    ──▶ Attempt::Invalid        → next server
//!                 └── Err(timeout/io)  ──▶ Attempt::TransientError → backoff, next server
//! ```

use crate::config::SyncSettings;
use crate::error::Error;
use crate::resolver::absolute_name;
use crate::rrset::RrSet;
use crate::traits::DnsExchange;
use hickory_proto::op::Message;
use hickory_proto::rr::{Name, RData, RecordType};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Outcome of querying one remote server
#[derive(Debug)]
pub enum Attempt {
    /// The server returned a usable answer
    Valid(RrSet),
    /// The server answered, but not with a single A rrset for the name
    Invalid,
    /// The server timed out or the transport failed
    TransientError(Error),
}

/// Check that a response carries exactly one rrset, owned by `name`,
/// holding at least one record, all of them A records.
pub fn validate_response(response: &Message, name: &Name) -> bool {
    let answers = response.answers();

    let Some(first) = answers.first() else {
        return false;
    };

    let single_rrset = answers.iter().all(|r| {
        r.name() == first.name()
            && r.record_type() == first.record_type()
            && r.dns_class() == first.dns_class()
    });

    single_rrset
        && first.name() == name
        && answers
            .iter()
            .all(|r| r.record_type() == RecordType::A && matches!(r.data(), Some(RData::A(_))))
}

/// Resolves load balancer hostnames against the remote server list
pub struct RemoteResolver {
    /// Query transport
    exchange: Arc<dyn DnsExchange>,

    /// Servers in retry order
    servers: Vec<SocketAddr>,

    /// Timeout for each query
    query_timeout: Duration,

    /// Pause after a transient failure before the next server
    transient_backoff: Duration,
}

impl RemoteResolver {
    /// Create a resolver over `servers`, tried in the given order
    pub fn new(
        exchange: Arc<dyn DnsExchange>,
        servers: Vec<SocketAddr>,
        settings: &SyncSettings,
    ) -> Self {
        Self {
            exchange,
            servers,
            query_timeout: settings.remote_query_timeout(),
            transient_backoff: settings.transient_backoff(),
        }
    }

    /// Query a single server and classify the outcome
    pub async fn attempt(&self, server: SocketAddr, name: &Name) -> Attempt {
        debug!(%server, %name, "Querying remote server");

        match self.exchange.query(server, name, self.query_timeout).await {
            Ok(response) if validate_response(&response, name) => {
                Attempt::Valid(RrSet::from_records(response.answers()))
            }
            Ok(response) => {
                debug!(%server, %name, answers = response.answers().len(),
                       "Invalid response: {:?}", response.answers());
                Attempt::Invalid
            }
            Err(e) if e.is_transient() => Attempt::TransientError(e),
            Err(e) => {
                debug!(%server, %name, "Unusable response: {}", e);
                Attempt::Invalid
            }
        }
    }

    /// Resolve `hostname`, returning the first valid answer.
    ///
    /// Returns `None` once every server has failed or answered invalidly.
    pub async fn resolve(&self, hostname: &str) -> Option<RrSet> {
        let name = match absolute_name(hostname) {
            Ok(name) => name,
            Err(e) => {
                warn!("Cannot resolve {}: {}", hostname, e);
                return None;
            }
        };

        for server in &self.servers {
            match self.attempt(*server, &name).await {
                Attempt::Valid(rrset) => {
                    debug!(%server, %name, %rrset, "Valid response");
                    return Some(rrset);
                }
                Attempt::Invalid => {
                    warn!(%server, %name, "Invalid response, trying next server");
                }
                Attempt::TransientError(e) => {
                    warn!(%server, %name, "Query failed: {}", e);
                    tokio::time::sleep(self.transient_backoff).await;
                }
            }
        }

        warn!(%name, servers = self.servers.len(), "No remote server returned a valid answer");
        None
    }
}
