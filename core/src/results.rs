//! # Session Results
//!
//! Accumulates the records of the currently active session and produces
//! immutable snapshots and the canonical persisted document. Single writer
//! while a session is live; snapshots are safe to read concurrently
//! because they are copies.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use lanscope_common::network::host::Host;
use lanscope_common::network::packet::{CapturedPacket, PacketRecord, Protocol};
use lanscope_common::network::range::Ipv4Range;

use crate::capture::SessionState;

/// One completed discovery sweep. Immutable once built.
#[derive(Debug, Clone)]
pub struct ScanSession {
    pub started: DateTime<Utc>,
    pub target: Ipv4Range,
    hosts: Vec<Host>,
}

impl ScanSession {
    pub fn new(started: DateTime<Utc>, target: Ipv4Range, hosts: Vec<Host>) -> Self {
        Self {
            started,
            target,
            hosts,
        }
    }

    pub fn hosts(&self) -> &[Host] {
        &self.hosts
    }

    /// An owned copy safe to hand to external consumers.
    pub fn snapshot(&self) -> Vec<Host> {
        self.hosts.clone()
    }

    /// Serializes the canonical scan document.
    pub fn export(&self) -> serde_json::Result<String> {
        let report = ScanReport {
            scan_info: ScanInfo {
                timestamp: self.started.to_rfc3339(),
                target_network: self.target.to_string(),
                total_devices: self.hosts.len(),
            },
            devices: self
                .hosts
                .iter()
                .map(|host| DeviceEntry {
                    ip: host.ip.to_string(),
                    mac: host.mac.to_string(),
                    vendor: host.vendor.clone(),
                    timestamp: host.last_seen.to_rfc3339(),
                })
                .collect(),
        };
        serde_json::to_string_pretty(&report)
    }

    /// Parses a document produced by [`export`](Self::export) back into a
    /// session. Used by consumers of previously persisted results.
    pub fn import(json: &str) -> anyhow::Result<Self> {
        let report: ScanReport = serde_json::from_str(json)?;
        let started = parse_ts(&report.scan_info.timestamp)?;
        let target = parse_target(&report.scan_info.target_network)?;

        let mut hosts = Vec::with_capacity(report.devices.len());
        for device in &report.devices {
            let seen = parse_ts(&device.timestamp)?;
            let mut host = Host::new(device.ip.parse()?, device.mac.parse()?)
                .with_vendor(device.vendor.clone());
            host.first_seen = seen;
            host.last_seen = seen;
            hosts.push(host);
        }
        Ok(Self::new(started, target, hosts))
    }
}

fn parse_ts(s: &str) -> anyhow::Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc))
}

fn parse_target(s: &str) -> anyhow::Result<Ipv4Range> {
    if let Ok(range) = Ipv4Range::from_cidr(s) {
        return Ok(range);
    }
    let (start, end) = s
        .split_once('-')
        .ok_or_else(|| anyhow::anyhow!("unrecognized target network: {s}"))?;
    Ok(Ipv4Range::new(start.parse()?, end.parse()?))
}

/// Canonical persisted shape, kept flat for external consumers.
#[derive(Debug, Serialize, Deserialize)]
struct ScanReport {
    scan_info: ScanInfo,
    devices: Vec<DeviceEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ScanInfo {
    timestamp: String,
    target_network: String,
    total_devices: usize,
}

#[derive(Debug, Serialize, Deserialize)]
struct DeviceEntry {
    ip: String,
    mac: String,
    vendor: String,
    timestamp: String,
}

/// Accumulator for the packets of the active sniff session.
///
/// Owns sequence numbering: numbers start at 1 and are handed out at
/// append time, which makes them monotonic by construction. Timestamps are
/// clamped to be non-decreasing; arrival order is authoritative even when
/// the wall clock steps backwards between frames.
#[derive(Debug, Default)]
pub struct ResultStore {
    packets: Vec<CapturedPacket>,
    stats: HashMap<Protocol, u64>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one classified frame, returning the stored record.
    pub fn append(&mut self, record: PacketRecord, timestamp: DateTime<Utc>) -> &CapturedPacket {
        let timestamp = match self.packets.last() {
            Some(prev) if timestamp < prev.timestamp => prev.timestamp,
            _ => timestamp,
        };
        *self.stats.entry(record.protocol).or_insert(0) += 1;
        self.packets.push(CapturedPacket {
            sequence: self.packets.len() as u64 + 1,
            timestamp,
            record,
        });
        // Just pushed, so the vec is non-empty.
        self.packets.last().unwrap()
    }

    pub fn len(&self) -> usize {
        self.packets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }

    /// Immutable snapshot, shareable across threads without locking.
    pub fn snapshot(&self) -> Arc<[CapturedPacket]> {
        self.packets.iter().cloned().collect()
    }

    /// Per-protocol packet counts, largest first.
    pub fn protocol_stats(&self) -> Vec<(Protocol, u64)> {
        let mut stats: Vec<(Protocol, u64)> =
            self.stats.iter().map(|(p, n)| (*p, *n)).collect();
        stats.sort_by(|a, b| b.1.cmp(&a.1));
        stats
    }

    /// Seals the store into a finished session.
    pub fn finish(
        self,
        started: DateTime<Utc>,
        filter: String,
        count_limit: Option<usize>,
        state: SessionState,
    ) -> SniffSession {
        SniffSession {
            started,
            ended: Utc::now(),
            filter,
            count_limit,
            packets: self.packets.into(),
            state,
        }
    }
}

/// One finished sniff session. Immutable.
#[derive(Debug)]
pub struct SniffSession {
    pub started: DateTime<Utc>,
    pub ended: DateTime<Utc>,
    pub filter: String,
    pub count_limit: Option<usize>,
    pub packets: Arc<[CapturedPacket]>,
    pub state: SessionState,
}
