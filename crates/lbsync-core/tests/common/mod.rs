//! Test doubles and common utilities for contract tests
//!
//! These doubles stand in for the DNS wire: a scripted query exchange, a
//! recording update transport that detects interleaved sends, static
//! credentials and a scripted host lookup.

#![allow(dead_code)]

use async_trait::async_trait;
use hickory_proto::op::{Message, ResponseCode};
use hickory_proto::rr::rdata::A;
use hickory_proto::rr::{Name, RData, Record};
use lbsync_core::config::{DomainConfig, SyncConfig, SyncSettings};
use lbsync_core::error::{Error, Result};
use lbsync_core::traits::{CredentialSource, DnsExchange, HostLookup, TsigKey, UpdateTransport};
use lbsync_core::{RrSet, SyncContext};
use std::collections::HashMap;
use std::net::{Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

/// Local authoritative server used by the default settings
pub const LOCAL: &str = "127.0.0.1:53";

pub fn addr(s: &str) -> SocketAddr {
    s.parse().unwrap()
}

fn key(name: &str) -> String {
    let name = name.trim_end_matches('.').to_ascii_lowercase();
    format!("{}.", name)
}

/// Build a response whose answer section holds one A rrset for `owner`
pub fn a_response(owner: &str, ttl: u32, ips: &[[u8; 4]]) -> Message {
    let mut message = Message::new();
    for ip in ips {
        message.add_answer(Record::from_rdata(
            Name::from_str(&key(owner)).unwrap(),
            ttl,
            RData::A(A::from(Ipv4Addr::from(*ip))),
        ));
    }
    message
}

/// A response with an empty answer section
pub fn empty_response() -> Message {
    Message::new()
}

pub fn rrset(ips: &[[u8; 4]], ttl: u32) -> RrSet {
    RrSet::new(ips.iter().map(|ip| Ipv4Addr::from(*ip)), ttl)
}

/// What a scripted server does for one (server, name) pair
#[derive(Clone)]
pub enum Reply {
    Answer(Message),
    Timeout,
    Fail,
    /// The server answered with something that is not a usable message
    Garbled,
}

/// A DnsExchange answering from a script and logging every query
pub struct ScriptedExchange {
    replies: Mutex<HashMap<(SocketAddr, String), Reply>>,
    calls: Mutex<Vec<(SocketAddr, String)>>,
}

impl ScriptedExchange {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn reply(&self, server: &str, name: &str, reply: Reply) {
        self.replies
            .lock()
            .unwrap()
            .insert((addr(server), key(name)), reply);
    }

    pub fn answer(&self, server: &str, name: &str, message: Message) {
        self.reply(server, name, Reply::Answer(message));
    }

    /// Every query made so far, as (server, absolute lowercase name)
    pub fn calls(&self) -> Vec<(SocketAddr, String)> {
        self.calls.lock().unwrap().clone()
    }

    /// Names queried on `server`, in order, without the trailing dot
    pub fn names_queried_on(&self, server: &str) -> Vec<String> {
        let server = addr(server);
        self.calls()
            .into_iter()
            .filter(|(s, _)| *s == server)
            .map(|(_, n)| n.trim_end_matches('.').to_string())
            .collect()
    }
}

#[async_trait]
impl DnsExchange for ScriptedExchange {
    async fn query(&self, server: SocketAddr, name: &Name, timeout: Duration) -> Result<Message> {
        let entry = (server, key(&name.to_ascii()));
        self.calls.lock().unwrap().push(entry.clone());

        let reply = self.replies.lock().unwrap().get(&entry).cloned();
        match reply {
            Some(Reply::Answer(message)) => Ok(message),
            Some(Reply::Fail) => Err(Error::transport("connection refused")),
            Some(Reply::Garbled) => Err(Error::invalid_response("message truncated mid-record")),
            Some(Reply::Timeout) | None => Err(Error::Timeout(timeout)),
        }
    }
}

/// One update observed by the RecordingTransport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentUpdate {
    pub zone: String,
    pub fqdn: String,
    pub addresses: Vec<Ipv4Addr>,
    pub key_name: String,
}

/// An UpdateTransport that records updates and fails on interleaved entry
pub struct RecordingTransport {
    code: ResponseCode,
    delay: Duration,
    in_flight: AtomicBool,
    overlap: AtomicBool,
    sent: Mutex<Vec<SentUpdate>>,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Self::with(ResponseCode::NoError, Duration::ZERO)
    }

    pub fn with(code: ResponseCode, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            code,
            delay,
            in_flight: AtomicBool::new(false),
            overlap: AtomicBool::new(false),
            sent: Mutex::new(Vec::new()),
        })
    }

    pub fn sent(&self) -> Vec<SentUpdate> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_for(&self, fqdn: &str) -> Vec<SentUpdate> {
        self.sent().into_iter().filter(|u| u.fqdn == fqdn).collect()
    }

    pub fn overlap_detected(&self) -> bool {
        self.overlap.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UpdateTransport for RecordingTransport {
    async fn send_update(
        &self,
        _server: SocketAddr,
        update: Message,
        key: &TsigKey,
        _timeout: Duration,
    ) -> Result<ResponseCode> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            self.overlap.store(true, Ordering::SeqCst);
            return Err(Error::transport("interleaved update send"));
        }

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let zone = update
            .queries()
            .first()
            .map(|q| q.name().to_ascii().trim_end_matches('.').to_string())
            .unwrap_or_default();
        let fqdn = update
            .name_servers()
            .first()
            .map(|r| r.name().to_ascii().trim_end_matches('.').to_string())
            .unwrap_or_default();
        let addresses = update
            .name_servers()
            .iter()
            .filter_map(|r| match r.data() {
                Some(RData::A(a)) => Some(a.0),
                _ => None,
            })
            .collect();

        self.sent.lock().unwrap().push(SentUpdate {
            zone,
            fqdn,
            addresses,
            key_name: key.name.clone(),
        });

        self.in_flight.store(false, Ordering::SeqCst);
        Ok(self.code)
    }
}

/// Credentials that are either always present or always missing
pub struct StaticCredentials {
    key: Option<TsigKey>,
    loads: AtomicUsize,
}

impl StaticCredentials {
    pub fn valid() -> Arc<Self> {
        Arc::new(Self {
            key: Some(TsigKey::new("local-ddns", b"secret".to_vec())),
            loads: AtomicUsize::new(0),
        })
    }

    pub fn missing() -> Arc<Self> {
        Arc::new(Self {
            key: None,
            loads: AtomicUsize::new(0),
        })
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialSource for StaticCredentials {
    async fn load(&self) -> Result<TsigKey> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.key
            .clone()
            .ok_or_else(|| Error::credential("key file has no secret"))
    }
}

/// A HostLookup answering from a fixed table
pub struct ScriptedLookup {
    answers: HashMap<String, RrSet>,
    lookups: AtomicUsize,
}

impl ScriptedLookup {
    pub fn new(answers: &[(&str, RrSet)]) -> Arc<Self> {
        Arc::new(Self {
            answers: answers
                .iter()
                .map(|(host, rrset)| (host.to_string(), rrset.clone()))
                .collect(),
            lookups: AtomicUsize::new(0),
        })
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HostLookup for ScriptedLookup {
    async fn lookup(&self, host: &str) -> Result<RrSet> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.answers
            .get(host)
            .cloned()
            .ok_or_else(|| Error::transport(format!("NXDOMAIN for {}", host)))
    }
}

/// Build a configuration from servers and (fqdn, zone, loadbalancer) triples
pub fn config(servers: &[&str], domains: &[(&str, &str, &str)]) -> SyncConfig {
    SyncConfig {
        remote_dns_servers: servers.iter().map(|s| s.to_string()).collect(),
        domains: domains
            .iter()
            .map(|(fqdn, zone, lb)| DomainConfig {
                fqdn: fqdn.to_string(),
                zone: zone.to_string(),
                loadbalancer: lb.to_string(),
            })
            .collect(),
        settings: SyncSettings::default(),
    }
}

/// Build a context over the given doubles
pub fn context(
    config: SyncConfig,
    exchange: &Arc<ScriptedExchange>,
    transport: &Arc<RecordingTransport>,
    credentials: &Arc<StaticCredentials>,
) -> SyncContext {
    SyncContext::new(
        config,
        Arc::clone(exchange) as Arc<dyn DnsExchange>,
        Arc::clone(transport) as Arc<dyn UpdateTransport>,
        Arc::clone(credentials) as Arc<dyn CredentialSource>,
    )
    .expect("context construction succeeds")
}
