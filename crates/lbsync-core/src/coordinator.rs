//! Supervisor for the per-load-balancer trackers
//!
//! The coordinator owns one task per load balancer, keyed by its hostname.
//! Trackers are independent: a tracker that fails or stalls never affects
//! another one.

use crate::context::SyncContext;
use crate::error::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{Instrument, info, info_span};

/// Owns the running trackers
pub struct SyncCoordinator {
    /// Shared context every tracker is built from
    context: Arc<SyncContext>,

    /// Running tracker tasks, keyed by load balancer hostname
    trackers: HashMap<String, JoinHandle<()>>,
}

impl SyncCoordinator {
    /// Create a coordinator with no running trackers
    pub fn new(context: Arc<SyncContext>) -> Self {
        Self {
            context,
            trackers: HashMap::new(),
        }
    }

    /// Spawn a tracker for every configured load balancer not already running.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Returns
    ///
    /// The number of trackers started by this call
    pub fn start(&mut self) -> Result<usize> {
        let mut started = 0;

        for load_balancer in self.context.load_balancers() {
            if self.is_running(&load_balancer.fqdn) {
                continue;
            }

            let tracker = self.context.tracker(load_balancer.clone())?;
            let span = info_span!("tracker", loadbalancer = %load_balancer.fqdn);
            info!(loadbalancer = %load_balancer.fqdn, "Starting tracker");

            let handle = tokio::spawn(tracker.run().instrument(span));
            self.trackers.insert(load_balancer.fqdn.clone(), handle);
            started += 1;
        }

        Ok(started)
    }

    /// Whether a tracker for `load_balancer` is currently running
    pub fn is_running(&self, load_balancer: &str) -> bool {
        self.trackers
            .get(load_balancer)
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Hostnames of all load balancers with a tracker task
    pub fn tracked(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.trackers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Abort every tracker task
    pub fn abort_all(&mut self) {
        for (name, handle) in self.trackers.drain() {
            info!(loadbalancer = %name, "Stopping tracker");
            handle.abort();
        }
    }
}
