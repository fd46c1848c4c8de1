//! Adapter-level dispatch: owns the worker table, runs the blocking packet
//! reader, and drains captured credentials back out as events.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use erdp::ErrorDisplay;
use macaddr::MacAddr6;
use tokio::sync::mpsc;

use crate::capture::{CaptureHandle, PcapCaptureHandle};
use crate::codec::{self, DCode, LinkCode, PppoesBody};
use crate::error::CaptureError;
use crate::event::{Event, EventSink, SessionAuthRequest};
use crate::task;
use crate::worker::{Credentials, Worker};

/// Binds one network adapter. A `Handler` processes every frame that
/// adapter sees and reports progress through its `EventSink`. Not meant for
/// concurrent calls to `run`/`close` from multiple callers at once.
pub struct Handler {
    adapter_mac: MacAddr6,
    capture: Option<Arc<dyn CaptureHandle>>,
    event_sink: EventSink,
    creds_tx: Mutex<Option<mpsc::Sender<Credentials>>>,
}

impl Handler {
    /// Opens `adapter_name` for capture. On failure, emits `Event::Error`
    /// and returns a `Handler` with no capture — `run()` on it is a no-op.
    pub fn open(adapter_name: &str, adapter_mac: MacAddr6, event_sink: EventSink) -> Self {
        let capture = match PcapCaptureHandle::open(adapter_name) {
            Ok(capture) => Some(Arc::new(capture) as Arc<dyn CaptureHandle>),
            Err(e) => {
                event_sink(Event::Error(format!(
                    "failed to open adapter {adapter_name}: {}",
                    e.display()
                )));
                None
            }
        };

        Self {
            adapter_mac,
            capture,
            event_sink,
            creds_tx: Mutex::new(None),
        }
    }

    #[cfg(test)]
    fn with_capture(adapter_mac: MacAddr6, capture: Arc<dyn CaptureHandle>, event_sink: EventSink) -> Self {
        Self {
            adapter_mac,
            capture: Some(capture),
            event_sink,
            creds_tx: Mutex::new(None),
        }
    }

    /// Runs until `close()` is called. Emits `Start`, then spawns a blocking
    /// reader task and drains credentials from it as `SessionAuthRequest`
    /// events, then emits `Stop`.
    pub async fn run(&self) {
        (self.event_sink)(Event::Start(self.adapter_mac));

        let (tx, mut rx) = mpsc::channel::<Credentials>(1);

        if let Some(capture) = self.capture.clone() {
            *self.creds_tx.lock().expect("creds_tx mutex poisoned") = Some(tx.clone());
            let adapter_mac = self.adapter_mac;
            let event_sink = self.event_sink.clone();
            task::spawn_supervised_blocking("pppoe-reader", move || {
                reader_loop(capture, adapter_mac, event_sink, tx);
            });
        } else {
            drop(tx);
        }

        while let Some(creds) = rx.recv().await {
            (self.event_sink)(Event::SessionAuthRequest(SessionAuthRequest::Captured {
                peer_id: creds.peer_id,
                password: creds.password,
            }));
        }

        (self.event_sink)(Event::Stop(self.adapter_mac));
    }

    /// Closes the capture handle, which unblocks the reader task's next
    /// read, and drops this handler's hold on the credentials channel so
    /// `run()`'s drain loop can end.
    pub fn close(&self) {
        if let Some(capture) = &self.capture {
            capture.close();
        }
        self.creds_tx.lock().expect("creds_tx mutex poisoned").take();
    }
}

fn reader_loop(
    capture: Arc<dyn CaptureHandle>,
    adapter_mac: MacAddr6,
    event_sink: EventSink,
    creds_tx: mpsc::Sender<Credentials>,
) {
    let mut workers: HashMap<MacAddr6, Worker> = HashMap::new();
    loop {
        match capture.recv() {
            Ok(frame) => handle_frame(&frame.0, &*capture, adapter_mac, &event_sink, &creds_tx, &mut workers),
            Err(CaptureError::Timeout) => continue,
            Err(_) => break,
        }
    }
}

fn handle_frame(
    bytes: &[u8],
    capture: &dyn CaptureHandle,
    adapter_mac: MacAddr6,
    event_sink: &EventSink,
    creds_tx: &mpsc::Sender<Credentials>,
    workers: &mut HashMap<MacAddr6, Worker>,
) {
    let Some(eth) = codec::parse_ethernet(bytes) else {
        return;
    };

    match eth.ethertype {
        codec::ETHERTYPE_PPPOE_DISCOVERY => {
            let pppoed = match codec::decode_pppoed(eth.payload) {
                Ok(p) => p,
                Err(e) => {
                    tracing::warn!(peer = %eth.src_mac, error = %e.display(), "failed to decode pppoed payload");
                    return;
                }
            };

            match pppoed.code {
                DCode::Padi => {
                    if workers.contains_key(&eth.src_mac) {
                        return;
                    }
                    workers.insert(eth.src_mac, Worker::new(eth.src_mac));
                    event_sink(Event::DiscoveryBroadcast(adapter_mac, eth.src_mac));
                }
                DCode::Padr => {
                    event_sink(Event::DiscoverySessionConfirmation(adapter_mac, eth.src_mac));
                }
                _ => {}
            }

            if let Some(worker) = workers.get(&eth.src_mac) {
                worker.handle_pppoed(&pppoed, capture, adapter_mac);
            }
        }
        codec::ETHERTYPE_PPPOE_SESSION => {
            let Some(worker) = workers.get(&eth.src_mac) else {
                return;
            };

            let pppoes = match codec::decode_pppoes(eth.payload) {
                Ok(p) => p,
                Err(e) => {
                    tracing::warn!(peer = %eth.src_mac, error = %e.display(), "failed to decode pppoes payload");
                    return;
                }
            };

            match &pppoes.body {
                PppoesBody::Lcp(lcp) => match lcp.code {
                    LinkCode::ConfigRequest => event_sink(Event::SessionRequest(adapter_mac, eth.src_mac)),
                    LinkCode::ConfigAck => event_sink(Event::SessionACK(adapter_mac, eth.src_mac)),
                    LinkCode::ConfigNak => event_sink(Event::SessionNak(adapter_mac, eth.src_mac)),
                    _ => {}
                },
                PppoesBody::Pap(_) => {
                    event_sink(Event::SessionAuthRequest(SessionAuthRequest::Detected {
                        adapter_mac,
                        peer_mac: eth.src_mac,
                    }));
                }
                PppoesBody::Other => {}
            }

            if let Some(creds) = worker.handle_pppoes(&pppoes, capture, adapter_mac) {
                if creds_tx.blocking_send(creds).is_err() {
                    tracing::warn!(peer = %eth.src_mac, "credentials channel closed, dropping capture");
                }
            }
        }
        _ => {}
    }
}
