use crate::error::LedgerError;
use std::collections::BTreeSet;

/// Manually registered peers, keyed by `host:port`.
#[derive(Clone, Debug, Default)]
pub struct PeerRegistry {
    nodes: BTreeSet<String>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `address` (`host:port` or a URL). Returns the stored form;
    /// registering an address twice is a no-op.
    pub fn register(&mut self, address: &str) -> Result<String, LedgerError> {
        let location = network_location(address)
            .ok_or_else(|| LedgerError::InvalidAddress(address.to_string()))?;
        self.nodes.insert(location.clone());
        Ok(location)
    }

    pub fn all(&self) -> impl Iterator<Item = &String> {
        self.nodes.iter()
    }

    pub fn contains(&self, address: &str) -> bool {
        self.nodes.contains(address)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Authority part of a URL, or the path-like prefix of a bare address.
fn network_location(address: &str) -> Option<String> {
    let address = address.trim();
    let rest = match address.split_once("://") {
        Some((scheme, rest)) if !scheme.is_empty() => rest,
        Some(_) => return None,
        None => address.strip_prefix("//").unwrap_or(address),
    };
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host = authority.rsplit_once('@').map_or(authority, |(_, host)| host);

    if host.is_empty() || host.chars().any(char::is_whitespace) {
        return None;
    }
    Some(host.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_url_form() {
        let mut peers = PeerRegistry::new();
        assert_eq!(peers.register("http://127.0.0.1:5001").unwrap(), "127.0.0.1:5001");
        assert_eq!(
            peers.register("https://user@node.example:8443/chain?x=1").unwrap(),
            "node.example:8443"
        );
        assert!(peers.contains("127.0.0.1:5001"));
        assert!(peers.contains("node.example:8443"));
    }

    #[test]
    fn registers_bare_form() {
        let mut peers = PeerRegistry::new();
        assert_eq!(peers.register("127.0.0.1:5002").unwrap(), "127.0.0.1:5002");
        assert_eq!(peers.register("localhost:5003/").unwrap(), "localhost:5003");
        assert_eq!(peers.register("//10.0.0.1:80").unwrap(), "10.0.0.1:80");
    }

    #[test]
    fn duplicate_registration_is_noop() {
        let mut peers = PeerRegistry::new();
        peers.register("http://127.0.0.1:5001").unwrap();
        peers.register("127.0.0.1:5001").unwrap();
        assert_eq!(peers.len(), 1);
    }

    #[test]
    fn rejects_unusable_addresses() {
        let mut peers = PeerRegistry::new();
        for bad in ["", "   ", "http://", "://host:1", "/only/a/path", "bad host:1"] {
            assert_eq!(
                peers.register(bad),
                Err(LedgerError::InvalidAddress(bad.to_string())),
                "{bad:?}"
            );
        }
        assert!(peers.is_empty());
    }

    #[test]
    fn all_lists_every_peer_once_in_order() {
        let mut peers = PeerRegistry::new();
        for addr in ["b:2", "a:1", "http://b:2", "c:3"] {
            peers.register(addr).unwrap();
        }
        let listed: Vec<&String> = peers.all().collect();
        assert_eq!(listed, ["a:1", "b:2", "c:3"]);
    }
}
