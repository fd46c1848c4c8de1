//! Error types for the two failure domains in this crate: decoding wire
//! frames, and driving the capture collaborator. Kept as two enums rather
//! than one because the call sites that raise and match them never overlap.

use thiserror::Error;

/// Failure decoding a PPPoE Discovery, Session, LCP or PAP frame.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("{context}: declared length exceeds available data")]
    InvalidLength { context: &'static str },

    #[error("option {option}: expected length {expected}, got {actual}")]
    InvalidOption {
        option: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// Failure talking to the packet-capture collaborator.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("failed to open adapter: {0}")]
    OpenFailed(String),

    #[error("failed to write packet: {0}")]
    WriteFailed(String),

    #[error("capture read timed out")]
    Timeout,

    #[error("capture handle is closed")]
    Closed,
}
