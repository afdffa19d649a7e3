//! Local authoritative lookups

use crate::config::SyncSettings;
use crate::error::Result;
use crate::resolver::absolute_name;
use crate::rrset::RrSet;
use crate::traits::DnsExchange;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Reads what the local server currently publishes for a domain
pub struct LocalResolver {
    exchange: Arc<dyn DnsExchange>,
    server: SocketAddr,
    query_timeout: Duration,
}

impl LocalResolver {
    /// Create a resolver for the local server named in `settings`
    pub fn new(exchange: Arc<dyn DnsExchange>, settings: &SyncSettings) -> Self {
        Self {
            exchange,
            server: settings.local_server,
            query_timeout: settings.local_query_timeout(),
        }
    }

    /// Resolve the A records of `fqdn` on the local server.
    ///
    /// An answer section without addresses yields `Ok(None)`; only
    /// transport failures are errors.
    pub async fn resolve_local(&self, fqdn: &str) -> Result<Option<RrSet>> {
        let name = absolute_name(fqdn)?;
        let response = self
            .exchange
            .query(self.server, &name, self.query_timeout)
            .await?;

        let rrset = RrSet::from_answers(&response);
        match &rrset {
            Some(rrset) => debug!(%name, %rrset, "Local response"),
            None => debug!(%name, "Local response has no addresses"),
        }
        Ok(rrset)
    }
}
