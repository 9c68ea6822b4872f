//! Raw frame construction and decoding for the discovery probes.
//!
//! Buffers are sized by the caller and every write is bounds-checked up
//! front; a short buffer is a [`PacketError`], never a panic.

use thiserror::Error;

pub mod arp;
pub mod ethernet;

pub const ETH_HDR_LEN: usize = 14;
pub const ARP_LEN: usize = 28;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PacketError {
    #[error("buffer too small for an Ethernet header")]
    EthernetBuffer,
    #[error("buffer too small for an ARP payload")]
    ArpBuffer,
}
