//! Address record sets
//!
//! An [`RrSet`] is the set of A addresses seen in one valid response plus
//! the TTL of that response. Equality looks at the addresses only: a local
//! copy and a freshly observed remote answer legitimately carry different
//! TTLs.

use hickory_proto::op::Message;
use hickory_proto::rr::{RData, Record, RecordType};
use std::collections::BTreeSet;
use std::fmt;
use std::net::Ipv4Addr;

/// Order-independent set of IPv4 addresses with its observed TTL
#[derive(Debug, Clone, Eq)]
pub struct RrSet {
    addresses: BTreeSet<Ipv4Addr>,
    ttl: u32,
}

impl RrSet {
    /// Create a record set from addresses and a TTL
    pub fn new(addresses: impl IntoIterator<Item = Ipv4Addr>, ttl: u32) -> Self {
        Self {
            addresses: addresses.into_iter().collect(),
            ttl,
        }
    }

    /// Collect the A records of an answer section.
    ///
    /// The TTL is the smallest TTL among the collected records. Records
    /// that are not A records are skipped; callers validate the shape of
    /// the answer before relying on the result.
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a Record>) -> Self {
        let mut addresses = BTreeSet::new();
        let mut ttl: Option<u32> = None;

        for record in records {
            if let Some(RData::A(a)) = record.data() {
                addresses.insert(a.0);
                ttl = Some(ttl.map_or(record.ttl(), |t| t.min(record.ttl())));
            }
        }

        Self {
            addresses,
            ttl: ttl.unwrap_or(0),
        }
    }

    /// Collect the A records of a response, `None` when it has no answers
    pub fn from_answers(message: &Message) -> Option<Self> {
        let rrset = Self::from_records(
            message
                .answers()
                .iter()
                .filter(|r| r.record_type() == RecordType::A),
        );
        (!rrset.is_empty()).then_some(rrset)
    }

    /// The addresses in ascending order
    pub fn addresses(&self) -> impl Iterator<Item = &Ipv4Addr> {
        self.addresses.iter()
    }

    /// TTL of the response the set was observed in
    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    /// Number of addresses
    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    /// Whether the set holds no addresses
    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}

impl PartialEq for RrSet {
    fn eq(&self, other: &Self) -> bool {
        self.addresses == other.addresses
    }
}

impl fmt::Display for RrSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let addrs: Vec<String> = self.addresses.iter().map(|a| a.to_string()).collect();
        write!(f, "[{}] ttl={}", addrs.join(", "), self.ttl)
    }
}
