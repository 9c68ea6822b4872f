//! Capture-interface selection.
//!
//! Discovery and capture both need one viable interface: up, not loopback,
//! carrying a MAC address and (for ARP sweeps) a private IPv4 network.

use anyhow::{Context, bail};
use pnet::datalink::{self, NetworkInterface};
use pnet::ipnetwork::{IpNetwork, Ipv4Network};

/// All interfaces, for operator-facing listings.
pub fn list() -> Vec<NetworkInterface> {
    datalink::interfaces()
}

/// Looks an interface up by name.
pub fn by_name(name: &str) -> anyhow::Result<NetworkInterface> {
    datalink::interfaces()
        .into_iter()
        .find(|i| i.name == name)
        .with_context(|| format!("no interface named {name}"))
}

/// Picks the interface to use: the named one when given, otherwise the
/// best viable LAN candidate.
pub fn select(name: Option<&str>) -> anyhow::Result<NetworkInterface> {
    match name {
        Some(name) => by_name(name),
        None => best_lan_interface(),
    }
}

/// The private IPv4 network of the best LAN interface.
pub fn lan_network() -> anyhow::Result<Ipv4Network> {
    let interface = best_lan_interface()?;
    ipv4_network(&interface)
        .with_context(|| format!("interface {} has no private IPv4 network", interface.name))
}

/// First private IPv4 network configured on `interface`.
pub fn ipv4_network(interface: &NetworkInterface) -> Option<Ipv4Network> {
    interface.ips.iter().find_map(|net| match net {
        IpNetwork::V4(v4) if v4.ip().is_private() => Some(*v4),
        _ => None,
    })
}

fn best_lan_interface() -> anyhow::Result<NetworkInterface> {
    let mut candidates: Vec<NetworkInterface> = datalink::interfaces()
        .into_iter()
        .filter(is_viable_lan_interface)
        .collect();

    // Wired interfaces ("en*"/"eth*") ahead of wireless ones.
    candidates.sort_by_key(|i| if i.name.starts_with('e') { 0 } else { 1 });

    match candidates.into_iter().next() {
        Some(interface) => Ok(interface),
        None => bail!("no viable interface for LAN discovery"),
    }
}

fn is_viable_lan_interface(interface: &NetworkInterface) -> bool {
    interface.is_up()
        && !interface.is_loopback()
        && !interface.is_point_to_point()
        && interface.mac.is_some()
        && ipv4_network(interface).is_some()
}
