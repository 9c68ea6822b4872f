//! # Traffic Capture Engine
//!
//! Owns the capture resource and turns it into an ordered stream of raw
//! frames. One dedicated producer thread polls the resource and feeds a
//! bounded channel; the single consumer side is the [`CaptureSession`]
//! handle. Cancellation is a cooperative flag checked before every poll, so
//! worst-case stop latency is one poll interval, and the resource is
//! released exactly once on every exit path because the producer thread
//! owns it outright.
//!
//! State machine: Idle → Running → {Stopped, Completed, Failed}. The three
//! terminal states all mean "resource released, engine restartable".

use std::io;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use chrono::{DateTime, Utc};
use pnet::datalink::{self, Channel, DataLinkReceiver, NetworkInterface};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use lanscope_common::Error;
use lanscope_common::config::CaptureConfig;
use lanscope_common::network::interface;

pub mod filter;

pub use filter::FilterExpr;

const POLL_INTERVAL: Duration = Duration::from_millis(500);
const QUEUE_DEPTH: usize = 256;

/// Where raw frames come from. The production implementation wraps a pnet
/// datalink receiver; tests substitute canned sources.
pub trait FrameSource: Send {
    /// Blocks for at most one poll interval. `Ok(None)` is a poll timeout,
    /// not end-of-stream.
    fn next_frame(&mut self) -> io::Result<Option<Vec<u8>>>;
}

struct DatalinkSource {
    rx: Box<dyn DataLinkReceiver>,
}

impl FrameSource for DatalinkSource {
    fn next_frame(&mut self) -> io::Result<Option<Vec<u8>>> {
        match self.rx.next() {
            Ok(frame) => Ok(Some(frame.to_vec())),
            Err(e) if matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock) => {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

/// One frame as it came off the wire, stamped at arrival.
#[derive(Debug, Clone)]
pub struct RawFrame {
    pub bytes: Vec<u8>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Running,
    /// Cancelled by the operator.
    Stopped,
    /// Count limit reached.
    Completed,
    /// The capture resource failed mid-session.
    Failed,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionState::Stopped | SessionState::Completed | SessionState::Failed
        )
    }
}

pub struct CaptureEngine;

impl CaptureEngine {
    /// Acquires the capture resource and starts the producer.
    ///
    /// Everything that can be rejected is rejected here, before the
    /// resource commits: the filter expression, the privilege level, and
    /// the interface itself.
    pub fn start(cfg: &CaptureConfig) -> Result<CaptureSession, Error> {
        let filter = FilterExpr::from_str(&cfg.filter)
            .map_err(|why| Error::InvalidFilter(cfg.filter.clone(), why))?;

        if !is_root::is_root() {
            return Err(Error::Permission(String::from(
                "live capture requires root",
            )));
        }

        let intf = interface::select(cfg.interface.as_deref())
            .map_err(|e| Error::Device(e.to_string()))?;
        let rx = open_receiver(&intf)?;
        info!("capture starting on {} (filter {:?})", intf.name, cfg.filter);

        Ok(Self::start_with_source(
            filter,
            cfg.count_limit,
            Box::new(DatalinkSource { rx }),
        ))
    }

    /// Spawns the producer over an already-acquired source.
    pub fn start_with_source(
        filter: FilterExpr,
        count_limit: Option<usize>,
        source: Box<dyn FrameSource>,
    ) -> CaptureSession {
        let (tx, rx) = mpsc::channel(QUEUE_DEPTH);
        let stop = Arc::new(AtomicBool::new(false));
        let state = Arc::new(Mutex::new(SessionState::Running));

        let producer = std::thread::spawn({
            let stop = Arc::clone(&stop);
            let state = Arc::clone(&state);
            move || produce(source, filter, count_limit, tx, stop, state)
        });

        CaptureSession {
            frames: rx,
            stop,
            state,
            producer: Some(producer),
            started: Utc::now(),
        }
    }
}

fn open_receiver(intf: &NetworkInterface) -> Result<Box<dyn DataLinkReceiver>, Error> {
    let config = datalink::Config {
        read_timeout: Some(POLL_INTERVAL),
        ..Default::default()
    };
    match datalink::channel(intf, config) {
        Ok(Channel::Ethernet(_tx, rx)) => Ok(rx),
        Ok(_) => Err(Error::Device(format!(
            "interface {} is not an ethernet channel",
            intf.name
        ))),
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
            Err(Error::Permission(e.to_string()))
        }
        Err(e) => Err(Error::Device(format!("opening {}: {e}", intf.name))),
    }
}

/// Producer loop. Owns the source; dropping it on return is the one and
/// only release of the capture resource.
fn produce(
    mut source: Box<dyn FrameSource>,
    filter: FilterExpr,
    count_limit: Option<usize>,
    tx: mpsc::Sender<RawFrame>,
    stop: Arc<AtomicBool>,
    state: Arc<Mutex<SessionState>>,
) {
    let mut delivered = 0usize;

    let terminal = loop {
        if stop.load(Ordering::Relaxed) {
            break SessionState::Stopped;
        }
        match source.next_frame() {
            Ok(Some(bytes)) => {
                if !filter.matches(&bytes) {
                    continue;
                }
                let frame = RawFrame {
                    timestamp: Utc::now(),
                    bytes,
                };
                if tx.blocking_send(frame).is_err() {
                    // Consumer hung up; treat like a stop request.
                    break SessionState::Stopped;
                }
                delivered += 1;
                if count_limit.is_some_and(|limit| delivered >= limit) {
                    debug!("count limit {count_limit:?} reached");
                    break SessionState::Completed;
                }
            }
            // Poll timeout: loop back and re-check the stop flag.
            Ok(None) => {}
            Err(e) => {
                error!("capture source failed: {e}");
                break SessionState::Failed;
            }
        }
    };

    if let Ok(mut s) = state.lock() {
        *s = terminal;
    }
    // `source` and `tx` drop here: resource released, channel closed.
}

/// Consumer-side handle for one capture session.
#[derive(Debug)]
pub struct CaptureSession {
    frames: mpsc::Receiver<RawFrame>,
    stop: Arc<AtomicBool>,
    state: Arc<Mutex<SessionState>>,
    producer: Option<JoinHandle<()>>,
    pub started: DateTime<Utc>,
}

impl CaptureSession {
    /// Next frame in arrival order. `None` once the producer has reached a
    /// terminal state and the queue is drained.
    pub async fn recv(&mut self) -> Option<RawFrame> {
        self.frames.recv().await
    }

    /// Requests cancellation and waits for the producer to let go of the
    /// capture resource. Returns the terminal state.
    ///
    /// Closing the receiving half first unblocks a producer that is
    /// waiting on a full queue, so this cannot deadlock.
    pub fn stop(&mut self) -> SessionState {
        self.stop.store(true, Ordering::Relaxed);
        self.frames.close();
        self.join_producer();
        self.state()
    }

    /// Waits for the producer to finish on its own (count limit or error).
    pub fn wait(&mut self) -> SessionState {
        self.join_producer();
        self.state()
    }

    pub fn state(&self) -> SessionState {
        self.state.lock().map_or(SessionState::Failed, |s| *s)
    }

    fn join_producer(&mut self) {
        if let Some(handle) = self.producer.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        // A session dropped mid-capture still releases the resource.
        self.stop.store(true, Ordering::Relaxed);
        self.frames.close();
        self.join_producer();
    }
}
