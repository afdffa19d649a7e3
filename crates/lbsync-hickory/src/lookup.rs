//! Recursive lookups for health checks

use async_trait::async_trait;
use hickory_resolver::TokioAsyncResolver;
use hickory_resolver::config::{NameServerConfigGroup, ResolverConfig, ResolverOpts};
use lbsync_core::{Error, HostLookup, Result, RrSet};
use std::net::{IpAddr, Ipv4Addr};
use tracing::debug;

/// Public recursive resolvers used when none are configured
pub const DEFAULT_HEALTH_RESOLVERS: [IpAddr; 2] = [
    IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8)),
    IpAddr::V4(Ipv4Addr::new(8, 8, 4, 4)),
];

/// Resolves hostnames through fixed recursive resolvers, with caching
pub struct PublicResolverLookup {
    resolver: TokioAsyncResolver,
}

impl PublicResolverLookup {
    /// Create a lookup over `resolvers` on port 53
    pub fn new(resolvers: &[IpAddr]) -> Self {
        let group = NameServerConfigGroup::from_ips_clear(resolvers, 53, true);
        let config = ResolverConfig::from_parts(None, vec![], group);

        let mut opts = ResolverOpts::default();
        opts.use_hosts_file = false;
        opts.cache_size = 256;

        Self {
            resolver: TokioAsyncResolver::tokio(config, opts),
        }
    }
}

impl Default for PublicResolverLookup {
    fn default() -> Self {
        Self::new(&DEFAULT_HEALTH_RESOLVERS)
    }
}

#[async_trait]
impl HostLookup for PublicResolverLookup {
    async fn lookup(&self, host: &str) -> Result<RrSet> {
        let lookup = self
            .resolver
            .ipv4_lookup(host)
            .await
            .map_err(|e| Error::transport(format!("lookup of {} failed: {}", host, e)))?;

        let ttl = lookup
            .as_lookup()
            .records()
            .iter()
            .map(|r| r.ttl())
            .min()
            .unwrap_or(0);
        let rrset = RrSet::new(lookup.iter().map(|a| a.0), ttl);

        if rrset.is_empty() {
            return Err(Error::invalid_response(format!("no addresses for {}", host)));
        }

        debug!(%host, %rrset, "Health lookup");
        Ok(rrset)
    }
}
