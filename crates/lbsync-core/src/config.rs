//! Configuration types for the lbsync system
//!
//! This module defines the INI configuration file format and the immutable
//! data model (load balancers and the domains mirroring them) built from it.
//!
//! ```ini
//! [DEFAULT]
//! RemoteDnsServers = 198.51.100.1, 203.0.113.7:5353
//! LocalServer = 127.0.0.1:53
//!
//! [www.example.com]
//! zone = example.com
//! loadbalancer = lb-1.cdn.example.net
//! ```
//!
//! Every section whose name looks like a hostname is a domain. Keys are
//! matched case-insensitively and domain sections inherit missing keys from
//! `[DEFAULT]`.

use crate::error::{Error, Result};
use ini::{Ini, Properties};
use std::collections::HashSet;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::time::Duration;

/// Standard DNS port, used when a server endpoint omits one
pub const DNS_PORT: u16 = 53;

/// Section holding the server list and the optional settings
const DEFAULT_SECTION: &str = "DEFAULT";

/// Main lbsync configuration
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Remote DNS servers, in retry order ("ip" or "ip:port")
    pub remote_dns_servers: Vec<String>,

    /// Domains to keep synchronized
    pub domains: Vec<DomainConfig>,

    /// Optional timing and endpoint settings
    pub settings: SyncSettings,
}

impl SyncConfig {
    /// Read and validate a configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_ini(&raw)
    }

    /// Parse and validate an INI configuration document
    pub fn from_ini(raw: &str) -> Result<Self> {
        let ini = Ini::load_from_str(raw)?;
        let defaults = ini
            .section(Some(DEFAULT_SECTION))
            .unwrap_or_else(|| ini.general_section());

        let remote_dns_servers = lookup(defaults, None, "RemoteDnsServers")
            .map(split_servers)
            .unwrap_or_default();

        let mut domains = Vec::new();
        for (name, section) in ini.iter() {
            let Some(name) = name.filter(|n| looks_like_hostname(n)) else {
                continue;
            };
            let required = |key: &str| {
                lookup(section, Some(defaults), key)
                    .map(str::to_string)
                    .ok_or_else(|| Error::config(format!("Section [{}] has no '{}'", name, key)))
            };
            domains.push(DomainConfig {
                fqdn: name.to_string(),
                zone: required("zone")?,
                loadbalancer: required("loadbalancer")?,
            });
        }

        let config = Self {
            remote_dns_servers,
            domains,
            settings: SyncSettings::from_section(defaults)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.remote_dns_servers.is_empty() {
            return Err(Error::config("No remote DNS servers configured"));
        }
        self.remote_servers()?;

        if self.domains.is_empty() {
            return Err(Error::config("No domains configured"));
        }

        let mut seen = HashSet::new();
        for domain in &self.domains {
            validate_hostname(&domain.fqdn)?;
            validate_hostname(&domain.zone)?;
            validate_hostname(&domain.loadbalancer)?;

            if !seen.insert(normalized(&domain.fqdn)) {
                return Err(Error::config(format!(
                    "Domain {} is configured more than once",
                    domain.fqdn
                )));
            }
        }

        Ok(())
    }

    /// Remote DNS server endpoints, in configuration order
    pub fn remote_servers(&self) -> Result<Vec<SocketAddr>> {
        self.remote_dns_servers
            .iter()
            .map(|s| parse_server(s))
            .collect()
    }

    /// Group the configured domains by load balancer.
    ///
    /// Load balancers appear in the order they are first referenced and
    /// each keeps its domains in configuration order.
    pub fn load_balancers(&self) -> Vec<LoadBalancer> {
        let mut groups: Vec<LoadBalancer> = Vec::new();

        for domain in &self.domains {
            let entry = Domain {
                fqdn: domain.fqdn.clone(),
                zone: domain.zone.clone(),
            };
            let key = normalized(&domain.loadbalancer);
            match groups.iter_mut().find(|lb| normalized(&lb.fqdn) == key) {
                Some(lb) => lb.domains.push(entry),
                None => groups.push(LoadBalancer {
                    fqdn: domain.loadbalancer.clone(),
                    domains: vec![entry],
                }),
            }
        }

        groups
    }
}

/// One synchronized domain as written in the configuration file
#[derive(Debug, Clone)]
pub struct DomainConfig {
    /// Name kept in sync on the local server
    pub fqdn: String,

    /// Zone the name belongs to
    pub zone: String,

    /// Remote hostname whose addresses the name mirrors
    pub loadbalancer: String,
}

/// A name to keep synchronized and the zone it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domain {
    /// Fully qualified domain name
    pub fqdn: String,
    /// Administrative zone
    pub zone: String,
}

/// A remote hostname plus the domains mirroring its addresses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadBalancer {
    /// Remote hostname
    pub fqdn: String,
    /// Mirroring domains, in configuration order
    pub domains: Vec<Domain>,
}

/// Timing and endpoint settings, read from optional `[DEFAULT]` keys
#[derive(Debug, Clone)]
pub struct SyncSettings {
    /// Local authoritative server (`LocalServer`)
    pub local_server: SocketAddr,

    /// Timeout for one remote query in seconds (`RemoteQueryTimeout`)
    pub remote_query_timeout_secs: u64,

    /// Timeout for one local query in seconds (`LocalQueryTimeout`)
    pub local_query_timeout_secs: u64,

    /// Timeout for one update exchange in seconds (`UpdateTimeout`)
    pub update_timeout_secs: u64,

    /// Pause after a remote server times out or errors, in seconds (`TransientBackoff`)
    pub transient_backoff_secs: u64,

    /// Interval before the next cycle when no remote server answered, in seconds (`FailureInterval`)
    pub failure_interval_secs: u64,

    /// Added to the remote TTL to get the next cycle interval, in seconds (`TtlPadding`)
    pub ttl_padding_secs: u64,
}

impl SyncSettings {
    fn from_section(section: &Properties) -> Result<Self> {
        let mut settings = Self::default();

        if let Some(raw) = lookup(section, None, "LocalServer") {
            settings.local_server = parse_server(raw)?;
        }

        let seconds = [
            ("RemoteQueryTimeout", &mut settings.remote_query_timeout_secs),
            ("LocalQueryTimeout", &mut settings.local_query_timeout_secs),
            ("UpdateTimeout", &mut settings.update_timeout_secs),
            ("TransientBackoff", &mut settings.transient_backoff_secs),
            ("FailureInterval", &mut settings.failure_interval_secs),
            ("TtlPadding", &mut settings.ttl_padding_secs),
        ];
        for (key, slot) in seconds {
            if let Some(raw) = lookup(section, None, key) {
                *slot = raw.trim().parse().map_err(|_| {
                    Error::config(format!("{} must be a number of seconds, got '{}'", key, raw))
                })?;
            }
        }

        Ok(settings)
    }

    /// Remote query timeout
    pub fn remote_query_timeout(&self) -> Duration {
        Duration::from_secs(self.remote_query_timeout_secs)
    }

    /// Local query timeout
    pub fn local_query_timeout(&self) -> Duration {
        Duration::from_secs(self.local_query_timeout_secs)
    }

    /// Update exchange timeout
    pub fn update_timeout(&self) -> Duration {
        Duration::from_secs(self.update_timeout_secs)
    }

    /// Backoff after a transient remote failure
    pub fn transient_backoff(&self) -> Duration {
        Duration::from_secs(self.transient_backoff_secs)
    }

    /// Next-cycle interval after a total resolution failure
    pub fn failure_interval(&self) -> Duration {
        Duration::from_secs(self.failure_interval_secs)
    }

    /// Next-cycle interval after a successful resolution
    pub fn success_interval(&self, ttl: u32) -> Duration {
        Duration::from_secs(u64::from(ttl).saturating_add(self.ttl_padding_secs))
    }
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            local_server: SocketAddr::from(([127, 0, 0, 1], DNS_PORT)),
            remote_query_timeout_secs: 5,
            local_query_timeout_secs: 3,
            update_timeout_secs: 5,
            transient_backoff_secs: 5,
            failure_interval_secs: 30,
            ttl_padding_secs: 1,
        }
    }
}

/// Case-insensitive key lookup, falling back to the default section
fn lookup<'a>(
    section: &'a Properties,
    defaults: Option<&'a Properties>,
    key: &str,
) -> Option<&'a str> {
    let find = |props: &'a Properties| {
        props
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    };
    find(section).or_else(|| defaults.and_then(find))
}

/// Server lists are separated by commas, whitespace or both
fn split_servers(raw: &str) -> Vec<String> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// A section names a domain when it contains a dot between two hostname characters
fn looks_like_hostname(section: &str) -> bool {
    let hostname_char = |b: u8| b.is_ascii_alphanumeric() || b == b'-';
    section
        .as_bytes()
        .windows(3)
        .any(|w| hostname_char(w[0]) && w[1] == b'.' && hostname_char(w[2]))
}

/// Comparison form of a name: lowercase, without the trailing dot
fn normalized(name: &str) -> String {
    name.trim_end_matches('.').to_ascii_lowercase()
}

/// Parse a server endpoint given as "ip", "ip:port" or "[v6]:port"
pub fn parse_server(server: &str) -> Result<SocketAddr> {
    let server = server.trim();
    if let Ok(addr) = server.parse::<SocketAddr>() {
        return Ok(addr);
    }
    server
        .parse::<IpAddr>()
        .map(|ip| SocketAddr::new(ip, DNS_PORT))
        .map_err(|_| Error::config(format!("Invalid DNS server endpoint: '{}'", server)))
}

/// Basic RFC 1035 hostname check, tolerating one trailing dot
pub fn validate_hostname(name: &str) -> Result<()> {
    let name = name.strip_suffix('.').unwrap_or(name);

    if name.is_empty() {
        return Err(Error::invalid_name("name cannot be empty"));
    }

    if name.len() > 253 {
        return Err(Error::invalid_name(format!(
            "name too long: {} chars (max 253): {}",
            name.len(),
            name
        )));
    }

    for label in name.split('.') {
        if label.is_empty() {
            return Err(Error::invalid_name(format!("empty label in '{}'", name)));
        }
        if label.len() > 63 {
            return Err(Error::invalid_name(format!(
                "label too long: {} chars (max 63): '{}'",
                label.len(),
                label
            )));
        }
        if !label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(Error::invalid_name(format!(
                "label contains invalid characters: '{}'",
                label
            )));
        }
        if label.starts_with('-') || label.ends_with('-') {
            return Err(Error::invalid_name(format!(
                "label cannot start or end with hyphen: '{}'",
                label
            )));
        }
    }

    Ok(())
}
