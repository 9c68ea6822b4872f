//! # Scan Target Model
//!
//! Parses the operator-supplied target into something the scanner can sweep:
//! * **Keyword**: "lan" — autodetect the local subnet.
//! * **Host**: a single IPv4 address.
//! * **Range**: "start-end" (`192.168.1.1-50` or full second address).
//! * **CIDR**: `192.168.1.0/24`.

use std::net::Ipv4Addr;
use std::str::FromStr;

use crate::network::interface;
use crate::network::range::Ipv4Range;

#[derive(Clone, Debug)]
pub enum Target {
    /// Sweep the autodetected local subnet.
    Lan,
    /// Probe a single host.
    Host { addr: Ipv4Addr },
    /// Sweep an explicit address range.
    Range { range: Ipv4Range },
}

impl Target {
    /// Resolves the target to the concrete range the scanner will probe.
    ///
    /// `Lan` needs a viable interface with a private IPv4 network; failing
    /// that is a device error, not a range error.
    pub fn resolve(&self) -> anyhow::Result<Ipv4Range> {
        match self {
            Target::Lan => {
                let net = interface::lan_network()?;
                Ok(Ipv4Range::from_cidr(&format!("{}/{}", net.ip(), net.prefix()))?)
            }
            Target::Host { addr } => Ok(Ipv4Range::new(*addr, *addr)),
            Target::Range { range } => Ok(*range),
        }
    }
}

impl FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("lan") {
            return Ok(Target::Lan);
        }

        if let Ok(addr) = s.parse::<Ipv4Addr>() {
            return Ok(Target::Host { addr });
        }

        if let Some(range) = parse_ip_range(s)? {
            return Ok(Target::Range { range });
        }

        if s.contains('/') {
            let range = Ipv4Range::from_cidr(s).map_err(|e| e.to_string())?;
            return Ok(Target::Range { range });
        }

        Err(format!("invalid target: {s}"))
    }
}

/// Parses `start-end` where `end` is either a full address or the final
/// octet (`192.168.1.1-50`).
fn parse_ip_range(s: &str) -> Result<Option<Ipv4Range>, String> {
    let Some((start, end)) = s.split_once('-') else {
        return Ok(None);
    };
    let Ok(start_addr) = start.parse::<Ipv4Addr>() else {
        return Ok(None);
    };

    let end_addr: Ipv4Addr = if let Ok(full) = end.parse::<Ipv4Addr>() {
        full
    } else if let Ok(last_octet) = end.parse::<u8>() {
        let [a, b, c, _] = start_addr.octets();
        Ipv4Addr::new(a, b, c, last_octet)
    } else {
        return Err(format!("invalid range end: {end}"));
    };

    if end_addr < start_addr {
        return Err(format!("range end {end_addr} precedes start {start_addr}"));
    }
    Ok(Some(Ipv4Range::new(start_addr, end_addr)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_parses_case_insensitively() {
        assert!(matches!("LAN".parse::<Target>().unwrap(), Target::Lan));
    }

    #[test]
    fn single_host_parses() {
        let target = "192.168.1.5".parse::<Target>().unwrap();
        let Target::Host { addr } = target else {
            panic!("expected host target");
        };
        assert_eq!(addr, Ipv4Addr::new(192, 168, 1, 5));
    }

    #[test]
    fn short_range_expands_the_final_octet() {
        let target = "192.168.1.1-50".parse::<Target>().unwrap();
        let Target::Range { range } = target else {
            panic!("expected range target");
        };
        assert_eq!(range.start_addr, Ipv4Addr::new(192, 168, 1, 1));
        assert_eq!(range.end_addr, Ipv4Addr::new(192, 168, 1, 50));
    }

    #[test]
    fn cidr_parses_as_range() {
        let target = "10.0.0.0/29".parse::<Target>().unwrap();
        assert!(matches!(target, Target::Range { .. }));
    }

    #[test]
    fn inverted_range_is_rejected() {
        assert!("192.168.1.50-192.168.1.1".parse::<Target>().is_err());
    }

    #[test]
    fn nonsense_is_rejected() {
        assert!("fridge".parse::<Target>().is_err());
    }
}
