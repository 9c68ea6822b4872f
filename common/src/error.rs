//! # Error Taxonomy
//!
//! Acquisition-time failures shared by the discovery scanner and the capture
//! engine. All of these surface synchronously, before any probe is sent or
//! any capture resource is committed.
//!
//! Per-record conditions (a host whose MAC changed mid-scan, a frame with
//! incomplete headers) are *not* errors: they are flags on the affected
//! record and never interrupt a running session.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Raw socket access requires elevated privileges.
    #[error("insufficient privilege for raw network access: {0}")]
    Permission(String),

    /// The capture interface is missing or could not be opened.
    #[error("capture interface unavailable: {0}")]
    Device(String),

    /// The capture filter expression was rejected.
    #[error("invalid capture filter {0:?}: {1}")]
    InvalidFilter(String, String),

    /// The target range is malformed or exceeds the sweep safety ceiling.
    #[error("invalid target range {0:?}: {1}")]
    InvalidRange(String, String),
}
