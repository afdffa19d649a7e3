//! Health evaluation: resolve-and-compare from the outside
//!
//! A health request maps load balancer hostnames to the domains expected
//! to mirror them:
//!
//! ```json
//! {"lb.example.net": ["a.example.com", "b.example.com"]}
//! ```
//!
//! Both sides of every pair are resolved through a [`HostLookup`] that is
//! independent from the synchronization path, and the address sets are
//! compared. The HTTP layer only maps [`HealthStatus`] to a status code and
//! writes [`HealthReport::render`] as the body.

use crate::error::{Error, Result};
use crate::rrset::RrSet;
use crate::traits::HostLookup;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, warn};

/// Load balancer → domains groups, in request order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthRequest {
    groups: Vec<(String, Vec<String>)>,
}

impl HealthRequest {
    /// Parse a JSON request body
    ///
    /// # Returns
    ///
    /// - `Ok(HealthRequest)`: Body is an object of string arrays
    /// - `Err(Error::MalformedRequest)`: Empty body, invalid JSON, or wrong shape
    pub fn parse(body: &[u8]) -> Result<Self> {
        if body.is_empty() {
            return Err(Error::malformed_request("request body is empty"));
        }

        let object: Map<String, Value> = serde_json::from_slice(body)
            .map_err(|e| Error::malformed_request(format!("invalid JSON: {}", e)))?;

        let groups = object
            .into_iter()
            .map(|(lb, domains)| {
                serde_json::from_value::<Vec<String>>(domains)
                    .map(|domains| (lb.clone(), domains))
                    .map_err(|e| {
                        Error::malformed_request(format!("domains for {} must be strings: {}", lb, e))
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { groups })
    }

    /// The groups, in request order
    pub fn groups(&self) -> &[(String, Vec<String>)] {
        &self.groups
    }
}

/// Aggregate result of a health check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    /// Every domain matches its load balancer
    Healthy,
    /// At least one domain differs or could not be resolved
    Degraded,
    /// The request could not be parsed
    BadRequest,
}

/// Per-domain results of a health check
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HealthReport {
    /// (domain, matches load balancer), in request order
    pub results: Vec<(String, bool)>,
}

impl HealthReport {
    /// Healthy iff every domain matched
    pub fn status(&self) -> HealthStatus {
        if self.results.iter().all(|(_, ok)| *ok) {
            HealthStatus::Healthy
        } else {
            HealthStatus::Degraded
        }
    }

    /// Plain-text body: one `OK: <domain>` or `ERROR: <domain>` line per domain
    pub fn render(&self) -> String {
        self.results
            .iter()
            .map(|(domain, ok)| {
                if *ok {
                    format!("OK: {}\n", domain)
                } else {
                    format!("ERROR: {}\n", domain)
                }
            })
            .collect()
    }
}

/// Compares domains against their load balancers through a [`HostLookup`]
pub struct HealthMonitor {
    lookup: Arc<dyn HostLookup>,
}

impl HealthMonitor {
    /// Create a monitor over `lookup`
    pub fn new(lookup: Arc<dyn HostLookup>) -> Self {
        Self { lookup }
    }

    /// Evaluate a raw request body
    ///
    /// A malformed body yields [`HealthStatus::BadRequest`] and an empty
    /// body without any lookups.
    pub async fn handle(&self, body: &[u8]) -> (HealthStatus, String) {
        match HealthRequest::parse(body) {
            Ok(request) => {
                let report = self.check(&request).await;
                (report.status(), report.render())
            }
            Err(e) => {
                debug!("Rejecting health request: {}", e);
                (HealthStatus::BadRequest, String::new())
            }
        }
    }

    /// Compare every domain of `request` against its load balancer.
    ///
    /// A failed lookup on either side marks the pair as not matching.
    pub async fn check(&self, request: &HealthRequest) -> HealthReport {
        let mut results = Vec::new();

        for (lb, domains) in request.groups() {
            let lb_rrset = self.resolve(lb).await;

            for domain in domains {
                let domain_rrset = self.resolve(domain).await;
                let ok = match (&lb_rrset, &domain_rrset) {
                    (Some(expected), Some(actual)) => expected == actual,
                    _ => false,
                };
                debug!(loadbalancer = %lb, %domain, ok, "Health comparison");
                results.push((domain.clone(), ok));
            }
        }

        HealthReport { results }
    }

    async fn resolve(&self, host: &str) -> Option<RrSet> {
        match self.lookup.lookup(host).await {
            Ok(rrset) => Some(rrset),
            Err(e) => {
                warn!(%host, "Health lookup failed: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_preserves_request_order() {
        let body = br#"{"lb-b.example.net": ["z.example.com", "a.example.com"], "lb-a.example.net": ["m.example.com"]}"#;
        let request = HealthRequest::parse(body).unwrap();
        let groups = request.groups();

        assert_eq!(groups[0].0, "lb-b.example.net");
        assert_eq!(groups[0].1, vec!["z.example.com", "a.example.com"]);
        assert_eq!(groups[1].0, "lb-a.example.net");
    }

    #[test]
    fn parse_rejects_bad_bodies() {
        let bodies: [&[u8]; 5] = [
            b"",
            b"not json",
            b"[1, 2]",
            br#"{"lb": "a.example.com"}"#,
            br#"{"lb": [1]}"#,
        ];
        for body in bodies {
            assert!(
                matches!(HealthRequest::parse(body), Err(Error::MalformedRequest(_))),
                "accepted {:?}",
                String::from_utf8_lossy(body)
            );
        }
    }

    #[test]
    fn render_and_status() {
        let report = HealthReport {
            results: vec![("a.example.com".into(), true), ("b.example.com".into(), false)],
        };
        assert_eq!(report.render(), "OK: a.example.com\nERROR: b.example.com\n");
        assert_eq!(report.status(), HealthStatus::Degraded);

        let empty = HealthReport::default();
        assert_eq!(empty.status(), HealthStatus::Healthy);
        assert_eq!(empty.render(), "");
    }
}
