//! Capture-adapter abstraction.
//!
//! [`CaptureHandle`] exists so the dispatch logic in `handler.rs` can be
//! exercised without a real network adapter. [`PcapCaptureHandle`] is the
//! production implementation over `libpcap`; `testing::FakeCaptureHandle`
//! is a queue-backed double used only by tests.

use std::sync::Mutex;

use pretty_hex::{hex_write, HexConfig};

use crate::error::CaptureError;

fn trace_frame(direction: &str, bytes: &[u8]) {
    if !tracing::enabled!(tracing::Level::TRACE) {
        return;
    }
    let mut conf = HexConfig::default();
    conf.title = false;
    let mut dump = String::new();
    let _ = hex_write(&mut dump, bytes, conf);
    tracing::trace!(%direction, len = bytes.len(), "{}", dump);
}

/// A frame read off the wire, owned so it can cross thread/channel
/// boundaries freely.
#[derive(Debug, Clone)]
pub struct OwnedFrame(pub Vec<u8>);

/// Everything the dispatch loop needs from a capture adapter: blocking
/// receive, blocking send, and a way to unstick a blocked receiver from
/// another thread.
pub trait CaptureHandle: Send + Sync {
    /// Blocks until a frame arrives, the per-read timeout elapses, or the
    /// handle is closed.
    fn recv(&self) -> Result<OwnedFrame, CaptureError>;

    /// Writes a raw frame (Ethernet header included) to the adapter.
    fn send(&self, frame: &[u8]) -> Result<(), CaptureError>;

    /// Marks the handle closed. Any in-flight or future `recv` call
    /// returns `CaptureError::Closed`.
    fn close(&self);
}

/// Production [`CaptureHandle`] backed by an open `libpcap` capture.
pub struct PcapCaptureHandle {
    inner: Mutex<Option<pcap::Capture<pcap::Active>>>,
}

impl PcapCaptureHandle {
    /// Opens `adapter_name` in non-promiscuous mode with a 1024-byte
    /// snaplen and a 10 second read timeout, matching the AC's passive
    /// listening posture (§4.5/§6).
    pub fn open(adapter_name: &str) -> Result<Self, CaptureError> {
        let device = pcap::Device::list()
            .map_err(|e| CaptureError::OpenFailed(e.to_string()))?
            .into_iter()
            .find(|d| d.name == adapter_name)
            .ok_or_else(|| CaptureError::OpenFailed(format!("no such device: {adapter_name}")))?;

        let capture = pcap::Capture::from_device(device)
            .map_err(|e| CaptureError::OpenFailed(e.to_string()))?
            .promisc(false)
            .snaplen(1024)
            .timeout(10_000)
            .open()
            .map_err(|e| CaptureError::OpenFailed(e.to_string()))?;

        Ok(Self {
            inner: Mutex::new(Some(capture)),
        })
    }
}

impl CaptureHandle for PcapCaptureHandle {
    fn recv(&self) -> Result<OwnedFrame, CaptureError> {
        let mut guard = self.inner.lock().expect("capture mutex poisoned");
        let capture = guard.as_mut().ok_or(CaptureError::Closed)?;
        match capture.next_packet() {
            Ok(packet) => {
                trace_frame("recv", packet.data);
                Ok(OwnedFrame(packet.data.to_vec()))
            }
            Err(pcap::Error::TimeoutExpired) => Err(CaptureError::Timeout),
            Err(_) => Err(CaptureError::Closed),
        }
    }

    fn send(&self, frame: &[u8]) -> Result<(), CaptureError> {
        let mut guard = self.inner.lock().expect("capture mutex poisoned");
        let capture = guard.as_mut().ok_or(CaptureError::Closed)?;
        trace_frame("send", frame);
        capture
            .sendpacket(frame)
            .map_err(|e| CaptureError::WriteFailed(e.to_string()))
    }

    fn close(&self) {
        let mut guard = self.inner.lock().expect("capture mutex poisoned");
        *guard = None;
    }
}
