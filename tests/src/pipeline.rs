//! End-to-end: capture session → classifier → result store.

use std::str::FromStr;

use lanscope_common::network::host::Host;
use lanscope_common::network::packet::Protocol;
use lanscope_common::network::range::Ipv4Range;
use lanscope_core::capture::{CaptureEngine, FilterExpr, SessionState};
use lanscope_core::classify;
use lanscope_core::results::{ResultStore, ScanSession};

use crate::util::{CannedSource, tcp_frame, udp_frame};

#[tokio::test]
async fn capture_classify_store_produces_ordered_annotated_records() {
    let frames = vec![
        tcp_frame(54321, 443),
        udp_frame(40000, 53),
        vec![0xde, 0xad], // truncated junk still yields a record
        tcp_frame(50000, 80),
    ];
    let mut session =
        CaptureEngine::start_with_source(FilterExpr::any(), Some(4), CannedSource::boxed(frames));

    let mut store = ResultStore::new();
    while let Some(frame) = session.recv().await {
        let record = classify::classify(&frame.bytes);
        store.append(record, frame.timestamp);
    }
    assert_eq!(session.wait(), SessionState::Completed);

    let packets = store.snapshot();
    assert_eq!(packets.len(), 4);

    // Sequences are 1-based and dense, timestamps never decrease.
    for (i, packet) in packets.iter().enumerate() {
        assert_eq!(packet.sequence, i as u64 + 1);
        if i > 0 {
            assert!(packet.timestamp >= packets[i - 1].timestamp);
        }
    }

    assert_eq!(packets[0].record.protocol, Protocol::Tcp);
    assert_eq!(packets[0].record.service, "HTTPS");
    assert!(!packets[0].record.malformed);

    assert_eq!(packets[1].record.service, "DNS");

    assert!(packets[2].record.malformed);
    assert_eq!(packets[2].record.length, 2);

    assert_eq!(packets[3].record.service, "HTTP");
}

#[tokio::test]
async fn filter_narrows_the_session_to_matching_frames() {
    let frames = vec![
        udp_frame(1111, 2222),
        tcp_frame(50000, 443),
        udp_frame(3333, 4444),
        tcp_frame(50001, 443),
    ];
    let filter = FilterExpr::from_str("tcp port 443").unwrap();
    let mut session = CaptureEngine::start_with_source(filter, Some(2), CannedSource::boxed(frames));

    let mut ports = Vec::new();
    while let Some(frame) = session.recv().await {
        ports.push(classify::classify(&frame.bytes).dst_port);
    }
    assert_eq!(session.wait(), SessionState::Completed);
    assert_eq!(ports, vec![Some(443), Some(443)]);
}

#[tokio::test]
async fn stopping_one_session_leaves_the_engine_reusable() {
    let mut first = CaptureEngine::start_with_source(
        FilterExpr::any(),
        None,
        CannedSource::boxed(vec![tcp_frame(1, 2)]),
    );
    first.recv().await.unwrap();
    assert_eq!(first.stop(), SessionState::Stopped);

    let mut second = CaptureEngine::start_with_source(
        FilterExpr::any(),
        Some(1),
        CannedSource::boxed(vec![udp_frame(3, 4)]),
    );
    assert!(second.recv().await.is_some());
    assert_eq!(second.wait(), SessionState::Completed);
}

#[test]
fn scan_sessions_survive_the_export_round_trip() {
    use chrono::Utc;
    use pnet::util::MacAddr;
    use std::net::Ipv4Addr;

    let target = Ipv4Range::from_cidr("192.168.1.0/24").unwrap();
    let hosts: Vec<Host> = (1..=5)
        .map(|i| {
            Host::new(
                Ipv4Addr::new(192, 168, 1, i),
                MacAddr::new(0x02, 0x00, 0x00, 0x00, 0x00, i),
            )
            .with_vendor(format!("Vendor {i}"))
        })
        .collect();
    let session = ScanSession::new(Utc::now(), target, hosts);

    let parsed = ScanSession::import(&session.export().unwrap()).unwrap();

    assert_eq!(parsed.target, session.target);
    let originals: Vec<_> = session
        .hosts()
        .iter()
        .map(|h| (h.ip, h.mac, h.vendor.clone()))
        .collect();
    let reparsed: Vec<_> = parsed
        .hosts()
        .iter()
        .map(|h| (h.ip, h.mac, h.vendor.clone()))
        .collect();
    assert_eq!(originals, reparsed);
}
