//! # Discovered Host Model
//!
//! A `Host` is one device that answered an address-resolution probe during a
//! sweep. The (ip, mac) pair is its identity; the vendor name is best-effort
//! enrichment resolved from the hardware prefix.

use std::net::Ipv4Addr;

use chrono::{DateTime, Utc};
use pnet::util::MacAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Host {
    pub ip: Ipv4Addr,
    pub mac: MacAddr,
    /// Vendor resolved from the OUI prefix, `"Unknown"` when unresolved.
    pub vendor: String,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    /// Set when a later reply mapped this ip to a different MAC address.
    /// The newest MAC wins; the flag records that the identity was unstable.
    pub mac_changed: bool,
}

impl Host {
    pub fn new(ip: Ipv4Addr, mac: MacAddr) -> Self {
        let now = Utc::now();
        Self {
            ip,
            mac,
            vendor: String::from("Unknown"),
            first_seen: now,
            last_seen: now,
            mac_changed: false,
        }
    }

    pub fn with_vendor(mut self, vendor: impl Into<String>) -> Self {
        self.vendor = vendor.into();
        self
    }

    /// Fold a later reply for the same ip into this entry.
    ///
    /// A matching MAC just refreshes `last_seen`; a different MAC replaces
    /// the stored one and marks the host as anomalous.
    pub fn merge_reply(&mut self, mac: MacAddr, seen: DateTime<Utc>) {
        if self.mac != mac {
            self.mac = mac;
            self.mac_changed = true;
        }
        self.last_seen = seen;
    }
}
