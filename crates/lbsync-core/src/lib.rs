// # lbsync-core
//
// Core library for mirroring load-balancer address records into a local
// authoritative DNS zone.
//
// ## Architecture Overview
//
// - **DnsExchange / UpdateTransport / CredentialSource / HostLookup**:
//   Traits at the I/O seams, implemented by `lbsync-hickory`
// - **RemoteResolver**: Ordered, validated fallback over independent servers
// - **LocalResolver**: What the local server currently publishes
// - **LocalUpdater**: TSIG-signed replacements, serialized process-wide
// - **SyncTracker**: One resolve → compare → update → sleep loop per load balancer
// - **SyncCoordinator**: Owns the tracker tasks
// - **HealthMonitor**: Resolve-and-compare for external health checks
//
// ## Design Principles
//
// 1. **Explicit context**: configuration, write lock and credentials live in
//    one `SyncContext`, no globals
// 2. **Failure isolation**: one domain or one load balancer failing never
//    stops another
// 3. **Expected outcomes are values**: a bad answer from a server is an
//    `Attempt::Invalid`, not an error
// 4. **TTL-driven scheduling**: the next check follows the remote answer's TTL

pub mod config;
pub mod context;
pub mod coordinator;
pub mod credentials;
pub mod error;
pub mod health;
pub mod resolver;
pub mod rrset;
pub mod tracker;
pub mod traits;
pub mod updater;

// Re-export core types for convenience
pub use config::{Domain, LoadBalancer, SyncConfig, SyncSettings};
pub use context::SyncContext;
pub use coordinator::SyncCoordinator;
pub use credentials::KeyFileCredentials;
pub use error::{Error, Result};
pub use health::{HealthMonitor, HealthReport, HealthRequest, HealthStatus};
pub use resolver::{LocalResolver, RemoteResolver};
pub use rrset::RrSet;
pub use tracker::{CycleReport, DomainOutcome, SyncTracker};
pub use traits::{CredentialSource, DnsExchange, HostLookup, TsigKey, UpdateTransport};
pub use updater::LocalUpdater;
