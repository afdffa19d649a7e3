//! Per-load-balancer synchronization loop
//!
//! A SyncTracker is responsible for one load balancer and the domains
//! mirroring it:
//! - Resolving the load balancer through the remote server list
//! - Comparing each domain's local records against the remote answer
//! - Replacing divergent local records via the shared updater
//! - Scheduling the next cycle from the remote TTL
//!
//! ## Cycle
//!
//! ```text
//! ┌────────────────┐  rrset   ┌────────────────┐ differs ┌──────────────┐
//! │ RemoteResolver │────────▶│ compare against │───────▶│ LocalUpdater │
//! └────────────────┘          │ LocalResolver   │        │ (write lock) │
//!         │ none              └────────────────┘        └──────────────┘
//!         ▼
//!   sleep 30s                  sleep ttl + 1s
//! ```

use crate::config::{Domain, LoadBalancer, SyncSettings};
use crate::error::Result;
use crate::resolver::{LocalResolver, RemoteResolver};
use crate::rrset::RrSet;
use crate::updater::LocalUpdater;
use hickory_proto::op::ResponseCode;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// What happened to one domain during a cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainOutcome {
    /// Local records already matched the remote answer
    InSync,

    /// An update was sent and accepted
    Updated,

    /// An update was sent and the server answered with a failure code
    Rejected(ResponseCode),

    /// Lookup, credential or transport failure
    Failed(String),
}

/// Summary of one tracker cycle
#[derive(Debug, Clone)]
pub struct CycleReport {
    /// The remote answer, if any server produced a valid one
    pub remote: Option<RrSet>,

    /// Per-domain outcome, in configuration order
    pub domains: Vec<(String, DomainOutcome)>,

    /// How long to wait before the next cycle
    pub next_interval: Duration,
}

/// Keeps the domains of one load balancer in line with its remote addresses
///
/// ## Lifecycle
///
/// 1. Create with [`SyncTracker::new()`] (or [`crate::SyncContext::tracker()`])
/// 2. Start with [`SyncTracker::run()`], which never returns
///
/// Errors for one domain are logged and never stop the loop or affect the
/// remaining domains.
pub struct SyncTracker {
    /// The tracked load balancer and its domains
    load_balancer: LoadBalancer,

    /// Remote server list resolver
    remote: RemoteResolver,

    /// Local server resolver
    local: LocalResolver,

    /// Shared-lock updater
    updater: LocalUpdater,

    /// Scheduling intervals
    settings: SyncSettings,
}

impl SyncTracker {
    /// Create a tracker
    pub fn new(
        load_balancer: LoadBalancer,
        remote: RemoteResolver,
        local: LocalResolver,
        updater: LocalUpdater,
        settings: &SyncSettings,
    ) -> Self {
        Self {
            load_balancer,
            remote,
            local,
            updater,
            settings: settings.clone(),
        }
    }

    /// Run cycles forever
    pub async fn run(self) {
        info!(
            loadbalancer = %self.load_balancer.fqdn,
            domains = self.load_balancer.domains.len(),
            "Tracker started"
        );

        loop {
            let report = self.run_cycle().await;
            debug!(
                loadbalancer = %self.load_balancer.fqdn,
                "Sleeping {} seconds",
                report.next_interval.as_secs()
            );
            tokio::time::sleep(report.next_interval).await;
        }
    }

    /// Run a single cycle: resolve, compare every domain, update divergent ones
    pub async fn run_cycle(&self) -> CycleReport {
        let lb = &self.load_balancer.fqdn;

        let Some(remote) = self.remote.resolve(lb).await else {
            let next_interval = self.settings.failure_interval();
            warn!(loadbalancer = %lb, "Remote resolution failed, retrying in {:?}", next_interval);
            return CycleReport {
                remote: None,
                domains: Vec::new(),
                next_interval,
            };
        };

        let mut domains = Vec::with_capacity(self.load_balancer.domains.len());
        for domain in &self.load_balancer.domains {
            let outcome = match self.sync_domain(domain, &remote).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(loadbalancer = %lb, domain = %domain.fqdn, zone = %domain.zone,
                           "Failed to synchronize domain: {}", e);
                    DomainOutcome::Failed(e.to_string())
                }
            };
            domains.push((domain.fqdn.clone(), outcome));
        }

        CycleReport {
            next_interval: self.settings.success_interval(remote.ttl()),
            remote: Some(remote),
            domains,
        }
    }

    /// Compare one domain against the remote answer and update it if needed
    async fn sync_domain(&self, domain: &Domain, remote: &RrSet) -> Result<DomainOutcome> {
        let local = self.local.resolve_local(&domain.fqdn).await?;

        if local.as_ref() == Some(remote) {
            info!(domain = %domain.fqdn, "Equal");
            return Ok(DomainOutcome::InSync);
        }

        debug!(
            domain = %domain.fqdn,
            local = %local.as_ref().map(ToString::to_string).unwrap_or_else(|| "none".to_string()),
            remote = %remote,
            "Local records differ"
        );

        let code = self.updater.update(&domain.zone, &domain.fqdn, remote).await?;
        if code == ResponseCode::NoError {
            info!(domain = %domain.fqdn, "Replaced local records with {}", remote);
            Ok(DomainOutcome::Updated)
        } else {
            warn!(domain = %domain.fqdn, zone = %domain.zone, rcode = ?code, "Local update rejected");
            Ok(DomainOutcome::Rejected(code))
        }
    }
}
