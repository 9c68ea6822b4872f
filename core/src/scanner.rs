//! # Address-Resolution Discovery Scanner
//!
//! Sweeps an IPv4 range with ARP who-has probes and reports every host that
//! answers inside the collection window. Probes go out through a bounded
//! worker pool; replies are consumed from a single collector so
//! deduplication sees them in one well-defined order.
//!
//! Requires root: the probes are raw layer-2 frames. All acquisition
//! failures (privilege, range, interface) surface before a single probe is
//! sent.

use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use chrono::{DateTime, Utc};
use pnet::datalink::{self, Channel, DataLinkReceiver, DataLinkSender, NetworkInterface};
use tracing::{debug, info};

use lanscope_common::Error;
use lanscope_common::config::ScanConfig;
use lanscope_common::network::host::Host;
use lanscope_common::network::interface;
use lanscope_common::network::range::Ipv4Range;
use lanscope_protocols::arp;

use crate::results::ScanSession;
use crate::vendors;

mod probe;

const CHANNEL_READ_TIMEOUT: std::time::Duration = std::time::Duration::from_millis(50);

/// Sweeps `range` and returns the finished session.
///
/// Blocks for the full collection window (or until `cfg.max_hosts` distinct
/// hosts replied). A host that does not answer is simply absent from the
/// result; that is not an error.
pub fn scan_network(range: &Ipv4Range, cfg: &ScanConfig) -> Result<ScanSession, Error> {
    range.validate()?;

    if !is_root::is_root() {
        return Err(Error::Permission(String::from(
            "sending address-resolution probes requires root",
        )));
    }

    let intf = interface::select(cfg.interface.as_deref())
        .map_err(|e| Error::Device(e.to_string()))?;
    let src_mac = intf
        .mac
        .ok_or_else(|| Error::Device(format!("interface {} has no MAC address", intf.name)))?;
    let src_addr = interface::ipv4_network(&intf)
        .map(|net| net.ip())
        .ok_or_else(|| Error::Device(format!("interface {} has no IPv4 address", intf.name)))?;

    // The receiver must exist before any probe leaves, otherwise the
    // earliest replies race the listener.
    let (tx, rx) = open_channel(&intf)?;

    let started = Utc::now();
    let targets = range.probe_targets();
    info!(
        "sweeping {} ({} targets) on {}",
        range,
        targets.len(),
        intf.name
    );

    let workers = probe::dispatch(
        Arc::new(Mutex::new(tx)),
        src_mac,
        src_addr,
        targets,
        cfg.probe_workers,
    );

    let hosts = collect_replies(rx, range, cfg);

    for worker in workers {
        let _ = worker.join();
    }

    Ok(ScanSession::new(started, *range, hosts))
}

fn open_channel(
    intf: &NetworkInterface,
) -> Result<(Box<dyn DataLinkSender>, Box<dyn DataLinkReceiver>), Error> {
    let config = datalink::Config {
        read_timeout: Some(CHANNEL_READ_TIMEOUT),
        ..Default::default()
    };
    match datalink::channel(intf, config) {
        Ok(Channel::Ethernet(tx, rx)) => Ok((tx, rx)),
        Ok(_) => Err(Error::Device(format!(
            "interface {} is not an ethernet channel",
            intf.name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            Err(Error::Permission(e.to_string()))
        }
        Err(e) => Err(Error::Device(format!("opening {}: {e}", intf.name))),
    }
}

/// Single collector: drains the receiver until the window closes.
fn collect_replies(
    mut rx: Box<dyn DataLinkReceiver>,
    range: &Ipv4Range,
    cfg: &ScanConfig,
) -> Vec<Host> {
    let deadline = Instant::now() + cfg.timeout;
    let mut found: HashMap<Ipv4Addr, Host> = HashMap::new();

    while Instant::now() < deadline {
        if cfg.max_hosts.is_some_and(|max| found.len() >= max) {
            debug!("host cap {:?} reached, closing window early", cfg.max_hosts);
            break;
        }
        match rx.next() {
            Ok(frame) => {
                if let Some((ip, mac)) = arp::parse_reply(frame) {
                    if range.contains(ip) {
                        absorb_reply(&mut found, ip, mac, Utc::now());
                    }
                }
            }
            // Read timeout; keep waiting until the window closes.
            Err(_) => {}
        }
    }

    let mut hosts: Vec<Host> = found
        .into_values()
        .map(|host| {
            let vendor = vendors::vendor_name(host.mac);
            host.with_vendor(vendor)
        })
        .collect();
    hosts.sort_by_key(|host| host.ip);
    hosts
}

/// Deduplicates by ip. A repeat with the same MAC refreshes the sighting;
/// a repeat with a different MAC keeps the newest MAC and flags the host.
fn absorb_reply(
    found: &mut HashMap<Ipv4Addr, Host>,
    ip: Ipv4Addr,
    mac: pnet::util::MacAddr,
    seen: DateTime<Utc>,
) {
    found
        .entry(ip)
        .and_modify(|host| host.merge_reply(mac, seen))
        .or_insert_with(|| Host::new(ip, mac));
}

#[cfg(test)]
mod tests {
    use super::*;
    use pnet::util::MacAddr;
    use std::io;
    use std::time::Duration;

    /// Replays canned frames, then times out forever.
    struct ReplayReceiver {
        frames: Vec<Vec<u8>>,
        cursor: usize,
    }

    impl ReplayReceiver {
        fn new(frames: Vec<Vec<u8>>) -> Box<dyn DataLinkReceiver> {
            Box::new(Self { frames, cursor: 0 })
        }
    }

    impl DataLinkReceiver for ReplayReceiver {
        fn next(&mut self) -> io::Result<&[u8]> {
            if self.cursor < self.frames.len() {
                let frame = &self.frames[self.cursor];
                self.cursor += 1;
                Ok(frame)
            } else {
                Err(io::Error::from(io::ErrorKind::TimedOut))
            }
        }
    }

    fn reply(ip: [u8; 4], mac_tail: u8) -> Vec<u8> {
        reply_mac(ip, MacAddr::new(0xaa, 0xbb, 0xcc, 0xdd, 0xee, mac_tail))
    }

    fn reply_mac(ip: [u8; 4], mac: MacAddr) -> Vec<u8> {
        use pnet::packet::arp::{ArpHardwareTypes, ArpOperations, MutableArpPacket};
        use pnet::packet::ethernet::{EtherTypes, MutableEthernetPacket};

        let mut frame = vec![0u8; 42];
        {
            let mut eth = MutableEthernetPacket::new(&mut frame).unwrap();
            eth.set_source(mac);
            eth.set_destination(MacAddr::broadcast());
            eth.set_ethertype(EtherTypes::Arp);
        }
        let mut arp = MutableArpPacket::new(&mut frame[14..]).unwrap();
        arp.set_hardware_type(ArpHardwareTypes::Ethernet);
        arp.set_protocol_type(EtherTypes::Ipv4);
        arp.set_hw_addr_len(6);
        arp.set_proto_addr_len(4);
        arp.set_operation(ArpOperations::Reply);
        arp.set_sender_hw_addr(mac);
        arp.set_sender_proto_addr(Ipv4Addr::new(ip[0], ip[1], ip[2], ip[3]));
        frame
    }

    fn window(ms: u64) -> ScanConfig {
        ScanConfig {
            timeout: Duration::from_millis(ms),
            ..ScanConfig::default()
        }
    }

    #[test]
    fn two_replies_inside_the_window_become_two_hosts() {
        let range = Ipv4Range::from_cidr("192.168.1.0/24").unwrap();
        let rx = ReplayReceiver::new(vec![
            reply_mac(
                [192, 168, 1, 100],
                MacAddr::new(0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff),
            ),
            reply_mac(
                [192, 168, 1, 101],
                MacAddr::new(0x11, 0x22, 0x33, 0x44, 0x55, 0x66),
            ),
        ]);

        let hosts = collect_replies(rx, &range, &window(50));

        assert_eq!(hosts.len(), 2);
        assert_eq!(hosts[0].ip, Ipv4Addr::new(192, 168, 1, 100));
        assert_eq!(
            hosts[0].mac,
            MacAddr::new(0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff)
        );
        assert_eq!(hosts[1].ip, Ipv4Addr::new(192, 168, 1, 101));
        assert!(!hosts[0].vendor.is_empty());
    }

    #[test]
    fn no_two_hosts_share_an_ip_after_dedup() {
        let range = Ipv4Range::from_cidr("192.168.1.0/24").unwrap();
        let rx = ReplayReceiver::new(vec![
            reply([192, 168, 1, 50], 0x01),
            reply([192, 168, 1, 50], 0x01),
            reply([192, 168, 1, 50], 0x01),
        ]);

        let hosts = collect_replies(rx, &range, &window(50));
        assert_eq!(hosts.len(), 1);
        assert!(!hosts[0].mac_changed);
    }

    #[test]
    fn mac_change_mid_window_keeps_newest_and_flags() {
        let range = Ipv4Range::from_cidr("192.168.1.0/24").unwrap();
        let rx = ReplayReceiver::new(vec![
            reply([192, 168, 1, 50], 0x01),
            reply([192, 168, 1, 50], 0x02),
        ]);

        let hosts = collect_replies(rx, &range, &window(50));
        assert_eq!(hosts.len(), 1);
        assert_eq!(hosts[0].mac.5, 0x02);
        assert!(hosts[0].mac_changed);
    }

    #[test]
    fn replies_outside_the_range_are_ignored() {
        let range = Ipv4Range::from_cidr("192.168.1.0/24").unwrap();
        let rx = ReplayReceiver::new(vec![
            reply([10, 0, 0, 1], 0x01),
            reply([192, 168, 1, 7], 0x02),
        ]);

        let hosts = collect_replies(rx, &range, &window(50));
        assert_eq!(hosts.len(), 1);
        assert_eq!(hosts[0].ip, Ipv4Addr::new(192, 168, 1, 7));
    }

    #[test]
    fn host_cap_closes_the_window_early() {
        let range = Ipv4Range::from_cidr("192.168.1.0/24").unwrap();
        let rx = ReplayReceiver::new(
            (1..=20).map(|i| reply([192, 168, 1, i], i)).collect(),
        );
        let cfg = ScanConfig {
            timeout: Duration::from_secs(5),
            max_hosts: Some(3),
            ..ScanConfig::default()
        };

        let start = Instant::now();
        let hosts = collect_replies(rx, &range, &cfg);
        assert_eq!(hosts.len(), 3);
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn oversized_range_fails_before_any_resource_is_touched() {
        let range = Ipv4Range::from_cidr("0.0.0.0/0").unwrap();
        let err = scan_network(&range, &ScanConfig::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidRange(_, _)));
    }
}
