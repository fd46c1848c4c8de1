//! Event sink contract the [`crate::handler::Handler`] reports lifecycle and
//! protocol observations through. The event set mirrors the original probe's
//! callback variants 1:1; see [`SessionAuthRequest`] for the one variant that
//! needs more than a MAC pair to carry its payload.

use macaddr::MacAddr6;
use std::fmt;
use std::sync::Arc;

/// The two distinct moments a PAP exchange is reported: the moment the
/// Handler classifies an inbound frame as carrying PAP (before the Worker has
/// actually parsed it), and the moment the Worker has decoded real
/// credentials off the wire. Both fire for a single real PAP exchange, in
/// that order — the first is a same-shape sibling of `SessionRequest` /
/// `SessionACK` / `SessionNak`, the second is the payload callers actually
/// want.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAuthRequest {
    Detected {
        adapter_mac: MacAddr6,
        peer_mac: MacAddr6,
    },
    Captured {
        peer_id: String,
        password: String,
    },
}

/// Observable events the Handler reports as it runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Start(MacAddr6),
    Stop(MacAddr6),
    DiscoveryBroadcast(MacAddr6, MacAddr6),
    DiscoverySessionConfirmation(MacAddr6, MacAddr6),
    SessionRequest(MacAddr6, MacAddr6),
    SessionACK(MacAddr6, MacAddr6),
    SessionNak(MacAddr6, MacAddr6),
    SessionAuthRequest(SessionAuthRequest),
    Error(String),
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Start(mac) => write!(f, "start watching {mac}"),
            Event::Stop(mac) => write!(f, "stopped watching {mac}"),
            Event::DiscoveryBroadcast(_, peer) => write!(f, "discovery broadcast to {peer}"),
            Event::DiscoverySessionConfirmation(_, peer) => {
                write!(f, "session confirmation to {peer}")
            }
            Event::SessionRequest(_, peer) => write!(f, "session request from {peer}"),
            Event::SessionACK(_, peer) => write!(f, "session ack from {peer}"),
            Event::SessionNak(_, peer) => write!(f, "session nak from {peer}"),
            Event::SessionAuthRequest(SessionAuthRequest::Detected { peer_mac, .. }) => {
                write!(f, "auth exchange detected with {peer_mac}")
            }
            Event::SessionAuthRequest(SessionAuthRequest::Captured { peer_id, .. }) => {
                write!(f, "captured credentials for {peer_id}")
            }
            Event::Error(msg) => write!(f, "error: {msg}"),
        }
    }
}

/// A thread-safe callback invoked from both the Handler's reader task and its
/// main `run` task (see the concurrency model in `SPEC_FULL.md` §5) — it must
/// tolerate concurrent invocation.
pub type EventSink = Arc<dyn Fn(Event) + Send + Sync>;
