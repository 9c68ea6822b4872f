//! # Protocol Classifier
//!
//! Turns one raw frame into a [`PacketRecord`]. The function is pure and
//! total: any byte sequence, including the empty one, produces a record.
//! Truncated or inconsistent headers yield whatever fields could be safely
//! extracted with `malformed` set; classification of later frames is never
//! affected.
//!
//! Every layer is read through pnet's bounds-checked packet views, so a
//! lying length field can at worst cut the parse short.

use std::net::IpAddr;

use pnet::packet::Packet;
use pnet::packet::arp::ArpPacket;
use pnet::packet::ethernet::{EtherTypes, EthernetPacket};
use pnet::packet::icmp::IcmpPacket;
use pnet::packet::icmpv6::Icmpv6Packet;
use pnet::packet::ip::{IpNextHeaderProtocol, IpNextHeaderProtocols};
use pnet::packet::ipv4::Ipv4Packet;
use pnet::packet::ipv6::Ipv6Packet;
use pnet::packet::tcp::TcpPacket;
use pnet::packet::udp::UdpPacket;

use lanscope_common::network::packet::{PacketRecord, Protocol};

use crate::services;

/// Classifies a raw frame. Never fails.
pub fn classify(frame: &[u8]) -> PacketRecord {
    let length = frame.len();
    let Some(eth) = EthernetPacket::new(frame) else {
        return PacketRecord::opaque(length);
    };

    match eth.get_ethertype() {
        EtherTypes::Ipv4 => classify_ipv4(eth.payload(), length),
        EtherTypes::Ipv6 => classify_ipv6(eth.payload(), length),
        EtherTypes::Arp => classify_arp(eth.payload(), length),
        // A valid frame of some protocol we do not decode.
        _ => PacketRecord {
            malformed: false,
            ..PacketRecord::opaque(length)
        },
    }
}

fn classify_ipv4(payload: &[u8], length: usize) -> PacketRecord {
    let Some(ip) = Ipv4Packet::new(payload) else {
        return PacketRecord::opaque(length);
    };
    let src = IpAddr::V4(ip.get_source());
    let dst = IpAddr::V4(ip.get_destination());
    transport_record(
        src,
        dst,
        ip.get_next_level_protocol(),
        ip.payload(),
        length,
    )
}

fn classify_ipv6(payload: &[u8], length: usize) -> PacketRecord {
    let Some(ip) = Ipv6Packet::new(payload) else {
        return PacketRecord::opaque(length);
    };
    let src = IpAddr::V6(ip.get_source());
    let dst = IpAddr::V6(ip.get_destination());
    transport_record(src, dst, ip.get_next_header(), ip.payload(), length)
}

fn classify_arp(payload: &[u8], length: usize) -> PacketRecord {
    let Some(arp) = ArpPacket::new(payload) else {
        return PacketRecord {
            protocol: Protocol::Arp,
            ..PacketRecord::opaque(length)
        };
    };
    PacketRecord {
        src_addr: Some(IpAddr::V4(arp.get_sender_proto_addr())),
        dst_addr: Some(IpAddr::V4(arp.get_target_proto_addr())),
        src_port: None,
        dst_port: None,
        protocol: Protocol::Arp,
        length,
        service: String::from("Unknown"),
        malformed: false,
    }
}

/// Decodes the transport layer once the network addresses are known.
///
/// A transport header that fails to parse keeps the protocol tag and the
/// addresses but marks the record malformed.
fn transport_record(
    src: IpAddr,
    dst: IpAddr,
    next: IpNextHeaderProtocol,
    payload: &[u8],
    length: usize,
) -> PacketRecord {
    let mut record = PacketRecord {
        src_addr: Some(src),
        dst_addr: Some(dst),
        src_port: None,
        dst_port: None,
        protocol: Protocol::Other,
        length,
        service: String::from("Unknown"),
        malformed: false,
    };

    match next {
        IpNextHeaderProtocols::Tcp => {
            record.protocol = Protocol::Tcp;
            match TcpPacket::new(payload) {
                Some(tcp) => {
                    record.src_port = Some(tcp.get_source());
                    record.dst_port = Some(tcp.get_destination());
                }
                None => record.malformed = true,
            }
        }
        IpNextHeaderProtocols::Udp => {
            record.protocol = Protocol::Udp;
            match UdpPacket::new(payload) {
                Some(udp) => {
                    record.src_port = Some(udp.get_source());
                    record.dst_port = Some(udp.get_destination());
                }
                None => record.malformed = true,
            }
        }
        IpNextHeaderProtocols::Icmp => {
            record.protocol = Protocol::Icmp;
            if IcmpPacket::new(payload).is_none() {
                record.malformed = true;
            }
        }
        IpNextHeaderProtocols::Icmpv6 => {
            record.protocol = Protocol::Icmp;
            if Icmpv6Packet::new(payload).is_none() {
                record.malformed = true;
            }
        }
        _ => {}
    }

    record.service = services::guess(record.dst_port, record.src_port);
    record
}
