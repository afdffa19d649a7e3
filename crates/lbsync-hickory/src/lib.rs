// # lbsync-hickory
//
// Network implementations of the lbsync-core I/O traits, built on
// hickory-dns.
//
// ## Provided Types
//
// - **HickoryExchange**: `DnsExchange` over UDP with `SyncClient`
// - **HickoryUpdateTransport**: `UpdateTransport` signing with a `TSigner`
// - **PublicResolverLookup**: `HostLookup` through a caching recursive resolver
//
// ## Constraints
//
// - One network exchange per call. No retries and no server fallback;
//   both belong to the resolvers in lbsync-core.
// - hickory-client is synchronous, so every exchange runs on the blocking
//   pool. The socket carries the caller's timeout; the task is only
//   abandoned after an extra grace period, so a caller holding a lock
//   never releases it while the exchange is still on the wire.
// - TSIG secrets are only ever handed to the signer, never logged.

mod exchange;
mod lookup;
mod tsig;
mod update;

pub use exchange::HickoryExchange;
pub use lookup::{DEFAULT_HEALTH_RESOLVERS, PublicResolverLookup};
pub use tsig::{TSIG_FUDGE_SECS, tsig_algorithm, tsig_signer};
pub use update::HickoryUpdateTransport;

use lbsync_core::Error;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinError;

/// Extra time granted to a blocking exchange past its socket timeout
pub(crate) const BLOCKING_GRACE: Duration = Duration::from_secs(1);

/// Run a blocking hickory-client exchange whose socket times out after `timeout`
pub(crate) async fn run_blocking<T, F>(timeout: Duration, exchange: F) -> Result<T, Error>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, Error> + Send + 'static,
{
    let task = tokio::task::spawn_blocking(exchange);
    bounded(timeout, task).await
}

async fn bounded<T>(
    timeout: Duration,
    task: impl Future<Output = Result<Result<T, Error>, JoinError>>,
) -> Result<T, Error> {
    match tokio::time::timeout(timeout + BLOCKING_GRACE, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => Err(Error::Other(format!("DNS task failed: {}", e))),
        Err(_) => Err(Error::Timeout(timeout)),
    }
}
