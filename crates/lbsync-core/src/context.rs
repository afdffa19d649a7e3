//! Process-wide synchronization context
//!
//! Built once at startup and shared by every tracker. It holds the
//! immutable configuration snapshot, the single local write lock and the
//! handles to the I/O implementations.

use crate::config::{LoadBalancer, SyncConfig};
use crate::error::Result;
use crate::resolver::{LocalResolver, RemoteResolver};
use crate::tracker::SyncTracker;
use crate::traits::{CredentialSource, DnsExchange, UpdateTransport};
use crate::updater::LocalUpdater;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared state handed to every tracker
pub struct SyncContext {
    /// Immutable configuration snapshot
    config: SyncConfig,

    /// Load balancer groups derived from the configuration
    load_balancers: Vec<LoadBalancer>,

    /// Serializes all writes to the local server
    write_lock: Arc<Mutex<()>>,

    /// TSIG key provider
    credentials: Arc<dyn CredentialSource>,

    /// Query transport for remote and local lookups
    exchange: Arc<dyn DnsExchange>,

    /// Signed update transport
    transport: Arc<dyn UpdateTransport>,
}

impl SyncContext {
    /// Create a context from a configuration and the I/O implementations
    ///
    /// # Returns
    ///
    /// - `Ok(SyncContext)`: Configuration is valid
    /// - `Err(Error::Config)`: Configuration failed validation
    pub fn new(
        config: SyncConfig,
        exchange: Arc<dyn DnsExchange>,
        transport: Arc<dyn UpdateTransport>,
        credentials: Arc<dyn CredentialSource>,
    ) -> Result<Self> {
        config.validate()?;
        let load_balancers = config.load_balancers();

        Ok(Self {
            config,
            load_balancers,
            write_lock: Arc::new(Mutex::new(())),
            credentials,
            exchange,
            transport,
        })
    }

    /// The configuration snapshot
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Load balancer groups, in configuration order
    pub fn load_balancers(&self) -> &[LoadBalancer] {
        &self.load_balancers
    }

    /// The shared local write lock
    pub fn write_lock(&self) -> Arc<Mutex<()>> {
        Arc::clone(&self.write_lock)
    }

    /// A resolver over the configured remote servers
    pub fn remote_resolver(&self) -> Result<RemoteResolver> {
        Ok(RemoteResolver::new(
            Arc::clone(&self.exchange),
            self.config.remote_servers()?,
            &self.config.settings,
        ))
    }

    /// A resolver for the local server
    pub fn local_resolver(&self) -> LocalResolver {
        LocalResolver::new(Arc::clone(&self.exchange), &self.config.settings)
    }

    /// An updater sharing the process-wide write lock
    pub fn local_updater(&self) -> LocalUpdater {
        LocalUpdater::new(
            Arc::clone(&self.transport),
            Arc::clone(&self.credentials),
            self.write_lock(),
            &self.config.settings,
        )
    }

    /// A tracker for one load balancer group
    pub fn tracker(&self, load_balancer: LoadBalancer) -> Result<SyncTracker> {
        Ok(SyncTracker::new(
            load_balancer,
            self.remote_resolver()?,
            self.local_resolver(),
            self.local_updater(),
            &self.config.settings,
        ))
    }
}
