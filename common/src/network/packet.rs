//! # Captured Packet Model
//!
//! The classifier reduces every raw frame to a [`PacketRecord`]; the result
//! store wraps it with a sequence number and timestamp as a
//! [`CapturedPacket`]. Records are immutable once produced.

use std::fmt;
use std::net::IpAddr;

use chrono::{DateTime, Utc};

/// Transport protocol tag extracted from the frame headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    Tcp,
    Udp,
    Icmp,
    Arp,
    Other,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Protocol::Tcp => "TCP",
            Protocol::Udp => "UDP",
            Protocol::Icmp => "ICMP",
            Protocol::Arp => "ARP",
            Protocol::Other => "Other",
        };
        f.write_str(name)
    }
}

/// What the classifier could safely extract from one frame.
///
/// All fields are best-effort: a truncated frame yields whatever outer
/// layers were intact, with `malformed` set. Producing one of these never
/// fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketRecord {
    pub src_addr: Option<IpAddr>,
    pub dst_addr: Option<IpAddr>,
    pub src_port: Option<u16>,
    pub dst_port: Option<u16>,
    pub protocol: Protocol,
    /// Raw frame length in bytes, headers included.
    pub length: usize,
    /// Well-known-port service guess, `"Unknown"` when nothing matched.
    pub service: String,
    /// Headers were incomplete or inconsistent.
    pub malformed: bool,
}

impl PacketRecord {
    /// An empty record for input that did not even carry a link header.
    pub fn opaque(length: usize) -> Self {
        Self {
            src_addr: None,
            dst_addr: None,
            src_port: None,
            dst_port: None,
            protocol: Protocol::Other,
            length,
            service: String::from("Unknown"),
            malformed: true,
        }
    }
}

/// A classified frame with its session identity attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedPacket {
    /// Assigned monotonically by the store at append time.
    pub sequence: u64,
    pub timestamp: DateTime<Utc>,
    pub record: PacketRecord,
}

impl CapturedPacket {
    /// Renders the canonical log line:
    ///
    /// `<ts> - INFO - Packet #1: TCP 192.168.1.100 -> 8.8.8.8 (66 bytes) Port: 54321 -> 443 Service: HTTPS`
    pub fn log_line(&self) -> String {
        format!(
            "{} - INFO - {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
            self
        )
    }
}

impl fmt::Display for CapturedPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = &self.record;
        let addr = |a: &Option<IpAddr>| a.map_or_else(|| String::from("?"), |a| a.to_string());
        let port = |p: &Option<u16>| p.map_or_else(|| String::from("-"), |p| p.to_string());
        write!(
            f,
            "Packet #{}: {} {} -> {} ({} bytes) Port: {} -> {} Service: {}",
            self.sequence,
            r.protocol,
            addr(&r.src_addr),
            addr(&r.dst_addr),
            r.length,
            port(&r.src_port),
            port(&r.dst_port),
            r.service,
        )
    }
}
