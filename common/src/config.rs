//! Explicit configuration values for the two engines.
//!
//! Constructed once by the caller and passed in; the engines keep no
//! mutable global state.

use std::time::Duration;

/// Settings for an address-resolution discovery sweep.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// How long the reply-collection window stays open after the probes
    /// have been handed to the worker pool.
    pub timeout: Duration,
    /// Stop collecting once this many distinct hosts have replied.
    pub max_hosts: Option<usize>,
    /// Number of probe-sender threads.
    pub probe_workers: usize,
    /// Interface name override; autodetected when `None`.
    pub interface: Option<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(3),
            max_hosts: None,
            probe_workers: 4,
            interface: None,
        }
    }
}

/// Settings for a live capture session.
#[derive(Debug, Clone, Default)]
pub struct CaptureConfig {
    /// Filter expression, e.g. `"tcp port 443"`. Empty captures everything.
    pub filter: String,
    /// Stop automatically after this many matching frames.
    pub count_limit: Option<usize>,
    /// Interface name override; autodetected when `None`.
    pub interface: Option<String>,
}
