//! Host address discovery
//!
//! Peers on the LAN need a URL they can actually reach, not the `0.0.0.0`
//! the server binds to. Discovery is best effort: any failure yields an
//! empty list.

use std::net::{IpAddr, Ipv4Addr, UdpSocket};

use serde::{Deserialize, Serialize};

/// Source of locally reachable IPv4 addresses
pub trait HostDiscovery: Send + Sync {
    fn ipv4_candidates(&self) -> Vec<Ipv4Addr>;
}

/// Discovery backed by the host's routing table
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemHostDiscovery;

impl HostDiscovery for SystemHostDiscovery {
    fn ipv4_candidates(&self) -> Vec<Ipv4Addr> {
        discover_ipv4_candidates()
    }
}

/// Discovery that always reports the same addresses (for testing)
#[derive(Debug, Default, Clone)]
pub struct StaticHostDiscovery {
    addrs: Vec<Ipv4Addr>,
}

impl StaticHostDiscovery {
    pub fn new(addrs: Vec<Ipv4Addr>) -> Self {
        Self { addrs }
    }
}

impl HostDiscovery for StaticHostDiscovery {
    fn ipv4_candidates(&self) -> Vec<Ipv4Addr> {
        rank_candidates(self.addrs.clone())
    }
}

/// Find IPv4 addresses other hosts are likely to reach this one on
pub fn discover_ipv4_candidates() -> Vec<Ipv4Addr> {
    rank_candidates(primary_outbound_ipv4().into_iter().collect())
}

/// Address of the interface the default route leaves through
///
/// Connecting a UDP socket only selects a route; no packet is sent.
fn primary_outbound_ipv4() -> Option<Ipv4Addr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).ok()?;
    socket.connect((Ipv4Addr::new(8, 8, 8, 8), 80)).ok()?;
    match socket.local_addr().ok()?.ip() {
        IpAddr::V4(ip) => Some(ip),
        IpAddr::V6(_) => None,
    }
}

/// Drop unusable addresses, de-duplicate, and put private LAN addresses first
pub fn rank_candidates(addrs: Vec<Ipv4Addr>) -> Vec<Ipv4Addr> {
    let mut ranked: Vec<Ipv4Addr> = Vec::with_capacity(addrs.len());
    for addr in addrs {
        if addr.is_loopback() || addr.is_unspecified() || addr.is_broadcast() {
            continue;
        }
        if !ranked.contains(&addr) {
            ranked.push(addr);
        }
    }
    ranked.sort_by_key(|addr| !addr.is_private());
    ranked
}

/// Addresses and URLs the relay is reachable on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostInfo {
    pub port: u16,
    pub ips: Vec<String>,
    pub urls: Vec<String>,
}

impl HostInfo {
    pub fn new(port: u16, addrs: &[Ipv4Addr]) -> Self {
        Self {
            port,
            ips: addrs.iter().map(ToString::to_string).collect(),
            urls: addrs
                .iter()
                .map(|addr| format!("http://{}:{}", addr, port))
                .collect(),
        }
    }

    /// Discover addresses with `discovery` and build the URL list
    pub fn discover(port: u16, discovery: &dyn HostDiscovery) -> Self {
        Self::new(port, &discovery.ipv4_candidates())
    }
}
