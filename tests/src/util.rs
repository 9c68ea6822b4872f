//! Frame builders shared by the integration tests.

use std::io;
use std::net::Ipv4Addr;
use std::time::Duration;

use pnet::packet::ethernet::{EtherTypes, MutableEthernetPacket};
use pnet::packet::ip::IpNextHeaderProtocols;
use pnet::packet::ipv4::MutableIpv4Packet;
use pnet::packet::tcp::MutableTcpPacket;
use pnet::packet::udp::MutableUdpPacket;
use pnet::util::MacAddr;

use lanscope_core::capture::FrameSource;

const ETH_LEN: usize = 14;
const IPV4_LEN: usize = 20;

fn base_frame(total: usize, next: pnet::packet::ip::IpNextHeaderProtocol) -> Vec<u8> {
    let mut frame = vec![0u8; total];
    {
        let mut eth = MutableEthernetPacket::new(&mut frame).unwrap();
        eth.set_source(MacAddr::new(0, 1, 2, 3, 4, 5));
        eth.set_destination(MacAddr::broadcast());
        eth.set_ethertype(EtherTypes::Ipv4);
    }
    {
        let mut ip = MutableIpv4Packet::new(&mut frame[ETH_LEN..]).unwrap();
        ip.set_version(4);
        ip.set_header_length(5);
        ip.set_total_length((total - ETH_LEN) as u16);
        ip.set_next_level_protocol(next);
        ip.set_source(Ipv4Addr::new(192, 168, 1, 100));
        ip.set_destination(Ipv4Addr::new(8, 8, 8, 8));
    }
    frame
}

pub fn tcp_frame(src_port: u16, dst_port: u16) -> Vec<u8> {
    let mut frame = base_frame(66, IpNextHeaderProtocols::Tcp);
    let mut tcp = MutableTcpPacket::new(&mut frame[ETH_LEN + IPV4_LEN..]).unwrap();
    tcp.set_source(src_port);
    tcp.set_destination(dst_port);
    tcp.set_data_offset(5);
    frame
}

pub fn udp_frame(src_port: u16, dst_port: u16) -> Vec<u8> {
    let mut frame = base_frame(ETH_LEN + IPV4_LEN + 8 + 12, IpNextHeaderProtocols::Udp);
    let mut udp = MutableUdpPacket::new(&mut frame[ETH_LEN + IPV4_LEN..]).unwrap();
    udp.set_source(src_port);
    udp.set_destination(dst_port);
    udp.set_length(8 + 12);
    frame
}

/// Canned source: yields the scripted frames, then times out forever.
pub struct CannedSource {
    frames: Vec<Vec<u8>>,
    cursor: usize,
}

impl CannedSource {
    pub fn boxed(frames: Vec<Vec<u8>>) -> Box<dyn FrameSource> {
        Box::new(Self { frames, cursor: 0 })
    }
}

impl FrameSource for CannedSource {
    fn next_frame(&mut self) -> io::Result<Option<Vec<u8>>> {
        if self.cursor < self.frames.len() {
            let frame = self.frames[self.cursor].clone();
            self.cursor += 1;
            Ok(Some(frame))
        } else {
            std::thread::sleep(Duration::from_millis(5));
            Ok(None)
        }
    }
}
