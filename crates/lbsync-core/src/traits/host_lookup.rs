// # Host Lookup Trait
//
// Defines the interface used by the health monitor to resolve a hostname
// to its address set through a recursive (and caching) resolver. This path
// is independent from the remote/local resolvers used for synchronization.
//
// ## Implementations
//
// - hickory-resolver against fixed public servers: `lbsync-hickory` crate

use crate::rrset::RrSet;
use async_trait::async_trait;

/// Trait for recursive hostname resolution
#[async_trait]
pub trait HostLookup: Send + Sync {
    /// Resolve the A records of `host`, following aliases
    ///
    /// # Returns
    ///
    /// - `Ok(RrSet)`: The final address set
    /// - `Err(Error)`: Resolution failed or returned no addresses
    async fn lookup(&self, host: &str) -> Result<RrSet, crate::Error>;
}
