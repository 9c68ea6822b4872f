//! Contiguous IPv4 address ranges and CIDR parsing.

use std::fmt;
use std::net::Ipv4Addr;

use crate::error::Error;

/// Hard ceiling on how many addresses one sweep may probe (a /16).
/// Anything larger is almost certainly an accidental full-range sweep.
pub const MAX_SWEEP_HOSTS: u64 = 65_536;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv4Range {
    pub start_addr: Ipv4Addr,
    pub end_addr: Ipv4Addr,
    /// CIDR prefix length when the range came from CIDR notation.
    prefix: Option<u8>,
}

impl Ipv4Range {
    pub fn new(start_addr: Ipv4Addr, end_addr: Ipv4Addr) -> Self {
        Self {
            start_addr,
            end_addr,
            prefix: None,
        }
    }

    /// Parses `a.b.c.d/len` notation.
    pub fn from_cidr(s: &str) -> Result<Self, Error> {
        let invalid = |why: &str| Error::InvalidRange(s.to_string(), why.to_string());

        let (addr, len) = s
            .split_once('/')
            .ok_or_else(|| invalid("expected CIDR notation"))?;
        let ip: Ipv4Addr = addr
            .parse()
            .map_err(|_| invalid("not an IPv4 address"))?;
        let prefix: u8 = len
            .parse()
            .map_err(|_| invalid("prefix length is not a number"))?;
        if prefix > 32 {
            return Err(invalid("prefix length exceeds 32"));
        }

        let network = pnet::ipnetwork::Ipv4Network::new(ip, prefix)
            .map_err(|e| invalid(&e.to_string()))?;
        Ok(Self {
            start_addr: network.network(),
            end_addr: network.broadcast(),
            prefix: Some(prefix),
        })
    }

    /// Total addresses covered, network/broadcast included.
    pub fn host_count(&self) -> u64 {
        let start: u32 = self.start_addr.into();
        let end: u32 = self.end_addr.into();
        u64::from(end.saturating_sub(start)) + 1
    }

    /// Rejects ranges that are inverted or larger than [`MAX_SWEEP_HOSTS`].
    pub fn validate(&self) -> Result<(), Error> {
        if self.end_addr < self.start_addr {
            return Err(Error::InvalidRange(
                self.to_string(),
                String::from("end address precedes start address"),
            ));
        }
        if self.host_count() > MAX_SWEEP_HOSTS {
            return Err(Error::InvalidRange(
                self.to_string(),
                format!(
                    "{} addresses exceeds the sweep ceiling of {}",
                    self.host_count(),
                    MAX_SWEEP_HOSTS
                ),
            ));
        }
        Ok(())
    }

    pub fn contains(&self, ip: Ipv4Addr) -> bool {
        self.start_addr <= ip && ip <= self.end_addr
    }

    pub fn iter(&self) -> impl Iterator<Item = Ipv4Addr> + use<> {
        let start: u32 = self.start_addr.into();
        let end: u32 = self.end_addr.into();
        (start..=end).map(Ipv4Addr::from)
    }

    /// Usable probe targets: skips the network and broadcast addresses of a
    /// CIDR block wider than a /31.
    pub fn probe_targets(&self) -> Vec<Ipv4Addr> {
        match self.prefix {
            Some(p) if p < 31 => self
                .iter()
                .filter(|ip| *ip != self.start_addr && *ip != self.end_addr)
                .collect(),
            _ => self.iter().collect(),
        }
    }
}

impl fmt::Display for Ipv4Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.prefix {
            Some(p) => write!(f, "{}/{}", self.start_addr, p),
            None => write!(f, "{}-{}", self.start_addr, self.end_addr),
        }
    }
}
