//! Static record table built once at startup and read-only afterwards.
//! Lookups are linear scans in insertion order; the table holds at most a
//! few hundred entries and no index structure is warranted.

use std::net::Ipv4Addr;

use crate::protocol::encode_name;

const WILDCARD: [u8; 2] = [1, b'*'];

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RecordEntry {
    /// Label-encoded name, no trailing root byte.
    name: Vec<u8>,
    /// Address octets in network order.
    ip: [u8; 4],
    /// Label-encoded decimal octets in reverse order, for PTR prefix
    /// matching against names ending in in-addr.arpa.
    reversed: Vec<u8>,
}

impl RecordEntry {
    fn from(name: &str, ip: Ipv4Addr) -> Self {
        let octets = ip.octets();
        let reversed = encode_name(&format!(
            "{}.{}.{}.{}",
            octets[3], octets[2], octets[1], octets[0]
        ));
        RecordEntry {
            name: encode_name(name),
            ip: octets,
            reversed,
        }
    }

    fn is_wildcard(&self) -> bool {
        self.name == WILDCARD
    }
}

pub struct RecordTable {
    entries: Vec<RecordEntry>,
}

impl RecordTable {
    /// Builds the table from (name, address text) pairs in input order.
    /// A pair whose address does not parse is logged and skipped; one bad
    /// line never aborts the load.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut entries = Vec::with_capacity(pairs.len());
        for (name, address) in pairs {
            match address.parse::<Ipv4Addr>() {
                Ok(ip) => {
                    debug!("name:{}, ip:{}", name, address);
                    entries.push(RecordEntry::from(&name, ip));
                }
                Err(_) => {
                    error!("bad address '{}' for '{}', skipping", address, name);
                }
            }
        }
        RecordTable { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Forward lookup: first entry that is the wildcard or whose encoded
    /// name equals the query name, ASCII case-insensitively.
    pub fn lookup_by_name(&self, query_name: &[u8]) -> Option<[u8; 4]> {
        self.entries
            .iter()
            .find(|e| e.is_wildcard() || e.name.eq_ignore_ascii_case(query_name))
            .map(|e| e.ip)
    }

    /// Reverse lookup: first entry that is the wildcard or whose reversed
    /// address digits are a byte-exact prefix of the query name. The query
    /// name is assumed to end in the in-addr.arpa suffix and is not
    /// re-validated here.
    pub fn lookup_by_reversed(&self, query_name: &[u8]) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|e| e.is_wildcard() || query_name.starts_with(&e.reversed))
            .map(|e| e.name.as_slice())
    }
}
