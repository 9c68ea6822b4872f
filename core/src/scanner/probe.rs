//! Bounded worker pool for probe transmission.
//!
//! Sends are fire-and-forget: a failed send just means that address gets no
//! reply, which the collector already treats as "not present".

use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use pnet::datalink::DataLinkSender;
use pnet::util::MacAddr;
use tracing::{debug, error};

use lanscope_protocols::arp;

/// Spawns up to `workers` sender threads, each crafting and transmitting
/// the ARP requests for one chunk of `targets`. Returns the join handles so
/// the caller can reap the pool after the collection window.
pub fn dispatch(
    tx: Arc<Mutex<Box<dyn DataLinkSender>>>,
    src_mac: MacAddr,
    src_addr: Ipv4Addr,
    targets: Vec<Ipv4Addr>,
    workers: usize,
) -> Vec<JoinHandle<()>> {
    let workers = workers.max(1);
    let chunk_size = targets.len().div_ceil(workers).max(1);

    targets
        .chunks(chunk_size)
        .map(|chunk| {
            let chunk = chunk.to_vec();
            let tx = Arc::clone(&tx);
            std::thread::spawn(move || send_chunk(&tx, src_mac, src_addr, &chunk))
        })
        .collect()
}

fn send_chunk(
    tx: &Mutex<Box<dyn DataLinkSender>>,
    src_mac: MacAddr,
    src_addr: Ipv4Addr,
    chunk: &[Ipv4Addr],
) {
    for target in chunk {
        let frame = match arp::request_frame(src_mac, src_addr, *target) {
            Ok(frame) => frame,
            Err(e) => {
                error!("failed to craft probe for {target}: {e}");
                continue;
            }
        };
        let mut sender = match tx.lock() {
            Ok(sender) => sender,
            // A panicked sibling worker poisons the lock; nothing left to do.
            Err(_) => return,
        };
        if let Some(Err(e)) = sender.send_to(&frame, None) {
            debug!("probe to {target} not sent: {e}");
        }
    }
}
