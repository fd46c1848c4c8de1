//! Per-peer PPPoE/LCP/PAP state machine.
//!
//! A `Worker` is created the moment a peer's PADI is seen and lives for as
//! long as the reader loop keeps it in its table. It owns no reference back
//! to whatever created it — every call is handed the capture handle and
//! adapter MAC it needs, so there's no ownership cycle to reason about.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Once;

use erdp::ErrorDisplay;
use macaddr::MacAddr6;
use rand::RngCore;

use crate::capture::CaptureHandle;
use crate::codec::{
    self, DCode, LinkCode, LinkCtrlProtocol, PPPoED, PPPoES, PppoesBody, SCode, AC_NAME,
    ETHERTYPE_PPPOE_DISCOVERY, ETHERTYPE_PPPOE_SESSION, P2P_PAP,
};

/// Credentials captured off a PAP Authenticate-Request, forwarded to the
/// handler's event drain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub peer_id: String,
    pub password: String,
}

/// State for a single peer working through Discovery and LCP. See §4.2 for
/// the transition table this implements.
pub struct Worker {
    peer_mac: MacAddr6,
    initial_lcp_sent: Once,
    magic_number: AtomicU32,
}

impl Worker {
    pub fn new(peer_mac: MacAddr6) -> Self {
        Self {
            peer_mac,
            initial_lcp_sent: Once::new(),
            magic_number: AtomicU32::new(rand::thread_rng().next_u32()),
        }
    }

    /// Replies to PADI with PADO and to PADR with PADS; no-op otherwise.
    pub fn handle_pppoed(&self, pppoed: &PPPoED, capture: &dyn CaptureHandle, adapter_mac: MacAddr6) {
        match pppoed.code {
            DCode::Padi => {
                let reply = PPPoED {
                    version_and_type: codec::VERSION_AND_TYPE,
                    code: DCode::Pado,
                    session_id: pppoed.session_id,
                    ac_name: Some(AC_NAME.to_string()),
                    ac_cookie: Some(random_cookie()),
                    host_uniq: pppoed.host_uniq.clone(),
                };
                self.send_pppoed(&reply, capture, adapter_mac);
            }
            DCode::Padr => {
                let reply = PPPoED {
                    version_and_type: codec::VERSION_AND_TYPE,
                    code: DCode::Pads,
                    session_id: pppoed.session_id + 1,
                    ac_name: Some(AC_NAME.to_string()),
                    ac_cookie: pppoed.ac_cookie.clone(),
                    host_uniq: pppoed.host_uniq.clone(),
                };
                self.send_pppoed(&reply, capture, adapter_mac);
            }
            _ => {}
        }
    }

    /// Drives LCP negotiation and extracts PAP credentials. Returns
    /// `Some(Credentials)` exactly when `pppoes` carries a PAP
    /// Authenticate-Request worth forwarding.
    pub fn handle_pppoes(
        &self,
        pppoes: &PPPoES,
        capture: &dyn CaptureHandle,
        adapter_mac: MacAddr6,
    ) -> Option<Credentials> {
        if pppoes.code != SCode::SessionData {
            tracing::warn!(peer = %self.peer_mac, code = ?pppoes.code, "unknown session code");
            return None;
        }

        match &pppoes.body {
            PppoesBody::Lcp(lcp) => {
                self.handle_link_ctrl_protocol(pppoes.session_id, lcp, capture, adapter_mac);
                None
            }
            PppoesBody::Pap(pap) => Some(Credentials {
                peer_id: pap.peer_id.clone(),
                password: pap.password.clone(),
            }),
            PppoesBody::Other => None,
        }
    }

    fn handle_link_ctrl_protocol(
        &self,
        peer_session_id: u16,
        lcp: &LinkCtrlProtocol,
        capture: &dyn CaptureHandle,
        adapter_mac: MacAddr6,
    ) {
        self.initial_lcp_sent.call_once(|| {
            let request = LinkCtrlProtocol {
                code: LinkCode::ConfigRequest,
                identifier: lcp.identifier.wrapping_add(1),
                max_receive_unit: lcp.max_receive_unit,
                auth_protocol: P2P_PAP,
                magic_number: self.magic_number.load(Ordering::Relaxed),
                pfc: false,
                acfc: false,
                callback_op: 0,
            };
            self.send_lcp(0x0001, request, capture, adapter_mac);
        });

        match lcp.code {
            LinkCode::ConfigRequest => {
                if lcp.pfc || lcp.acfc || lcp.callback_op != 0 {
                    let reject = LinkCtrlProtocol {
                        code: LinkCode::ConfigReject,
                        identifier: lcp.identifier,
                        max_receive_unit: 0,
                        auth_protocol: 0,
                        magic_number: 0,
                        pfc: lcp.pfc,
                        acfc: lcp.acfc,
                        callback_op: lcp.callback_op,
                    };
                    self.send_lcp(peer_session_id, reject, capture, adapter_mac);
                    return;
                }

                let ack = LinkCtrlProtocol {
                    code: LinkCode::ConfigAck,
                    identifier: lcp.identifier,
                    max_receive_unit: lcp.max_receive_unit,
                    auth_protocol: lcp.auth_protocol,
                    magic_number: lcp.magic_number,
                    pfc: lcp.pfc,
                    acfc: lcp.acfc,
                    callback_op: lcp.callback_op,
                };
                self.send_lcp(0x0001, ack, capture, adapter_mac);
            }
            LinkCode::ConfigReject | LinkCode::ConfigAck => {}
            _ => {}
        }
    }

    fn send_pppoed(&self, pppoed: &PPPoED, capture: &dyn CaptureHandle, adapter_mac: MacAddr6) {
        let payload = codec::encode_pppoed(pppoed);
        let frame = codec::encode_ethernet(self.peer_mac, adapter_mac, ETHERTYPE_PPPOE_DISCOVERY, &payload);
        if let Err(e) = capture.send(&frame) {
            tracing::error!(peer = %self.peer_mac, error = %e.display(), "failed to send pppoed reply");
        }
    }

    fn send_lcp(&self, session_id: u16, lcp: LinkCtrlProtocol, capture: &dyn CaptureHandle, adapter_mac: MacAddr6) {
        let pppoes = PPPoES {
            version_and_type: codec::VERSION_AND_TYPE,
            code: SCode::SessionData,
            session_id,
            p2p_protocol: codec::P2P_LCP,
            body: PppoesBody::Lcp(lcp),
        };
        let payload = codec::encode_pppoes(&pppoes);
        let frame = codec::encode_ethernet(self.peer_mac, adapter_mac, ETHERTYPE_PPPOE_SESSION, &payload);
        if let Err(e) = capture.send(&frame) {
            tracing::error!(peer = %self.peer_mac, error = %e.display(), "failed to send lcp frame");
        }
    }
}

fn random_cookie() -> Vec<u8> {
    let mut cookie = vec![0u8; 20];
    rand::thread_rng().fill_bytes(&mut cookie);
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::testing::FakeCaptureHandle;
    use crate::codec::{decode_pppoed, decode_pppoes};

    fn peer() -> MacAddr6 {
        MacAddr6::new(0x00, 0x11, 0x22, 0x33, 0x44, 0x55)
    }

    fn adapter() -> MacAddr6 {
        MacAddr6::new(0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff)
    }

    #[test]
    fn padi_is_answered_with_pado() {
        let worker = Worker::new(peer());
        let fake = FakeCaptureHandle::new(vec![]);
        let padi = PPPoED {
            version_and_type: codec::VERSION_AND_TYPE,
            code: DCode::Padi,
            session_id: 0,
            ac_name: None,
            ac_cookie: None,
            host_uniq: Some(vec![0x01]),
        };
        worker.handle_pppoed(&padi, &fake, adapter());

        let sent = fake.outbound.lock().unwrap();
        assert_eq!(sent.len(), 1);
        let eth = codec::parse_ethernet(&sent[0]).unwrap();
        assert_eq!(eth.ethertype, ETHERTYPE_PPPOE_DISCOVERY);
        let pado = decode_pppoed(eth.payload).unwrap();
        assert_eq!(pado.code, DCode::Pado);
        assert_eq!(pado.ac_name.as_deref(), Some(AC_NAME));
        assert_eq!(pado.host_uniq, Some(vec![0x01]));
        assert!(pado.ac_cookie.is_some());
    }

    #[test]
    fn padr_echoes_cookie_and_bumps_session_id() {
        let worker = Worker::new(peer());
        let fake = FakeCaptureHandle::new(vec![]);
        let padr = PPPoED {
            version_and_type: codec::VERSION_AND_TYPE,
            code: DCode::Padr,
            session_id: 0x0001,
            ac_name: None,
            ac_cookie: Some(vec![0xaa; 20]),
            host_uniq: Some(vec![0x02]),
        };
        worker.handle_pppoed(&padr, &fake, adapter());

        let sent = fake.outbound.lock().unwrap();
        let eth = codec::parse_ethernet(&sent[0]).unwrap();
        let pads = decode_pppoed(eth.payload).unwrap();
        assert_eq!(pads.code, DCode::Pads);
        assert_eq!(pads.session_id, 0x0002);
        assert_eq!(pads.ac_cookie, Some(vec![0xaa; 20]));
    }

    fn lcp_request(identifier: u8, mru: u16, pfc: bool, acfc: bool, callback: u8) -> PPPoES {
        PPPoES {
            version_and_type: codec::VERSION_AND_TYPE,
            code: SCode::SessionData,
            session_id: 0x1234,
            p2p_protocol: codec::P2P_LCP,
            body: PppoesBody::Lcp(LinkCtrlProtocol {
                code: LinkCode::ConfigRequest,
                identifier,
                max_receive_unit: mru,
                auth_protocol: 0,
                magic_number: 0,
                pfc,
                acfc,
                callback_op: callback,
            }),
        }
    }

    #[test]
    fn first_lcp_frame_triggers_initial_config_request_then_ack() {
        let worker = Worker::new(peer());
        let fake = FakeCaptureHandle::new(vec![]);
        let req = lcp_request(0x05, 1492, false, false, 0);

        let creds = worker.handle_pppoes(&req, &fake, adapter());
        assert!(creds.is_none());

        let sent = fake.outbound.lock().unwrap();
        assert_eq!(sent.len(), 2, "expected initial ConfigRequest + ConfigAck");

        let first = decode_pppoes(codec::parse_ethernet(&sent[0]).unwrap().payload).unwrap();
        match first.body {
            PppoesBody::Lcp(lcp) => {
                assert_eq!(lcp.code, LinkCode::ConfigRequest);
                assert_eq!(lcp.auth_protocol, P2P_PAP);
                assert_eq!(first.session_id, 0x0001);
            }
            _ => panic!("expected lcp body"),
        }

        let second = decode_pppoes(codec::parse_ethernet(&sent[1]).unwrap().payload).unwrap();
        match second.body {
            PppoesBody::Lcp(lcp) => {
                assert_eq!(lcp.code, LinkCode::ConfigAck);
                assert_eq!(second.session_id, 0x0001);
                assert_eq!(lcp.identifier, 0x05);
            }
            _ => panic!("expected lcp body"),
        }
    }

    #[test]
    fn initial_config_request_is_sent_only_once() {
        let worker = Worker::new(peer());
        let fake = FakeCaptureHandle::new(vec![]);
        worker.handle_pppoes(&lcp_request(0x01, 1492, false, false, 0), &fake, adapter());
        worker.handle_pppoes(&lcp_request(0x02, 1492, false, false, 0), &fake, adapter());

        let sent = fake.outbound.lock().unwrap();
        // 1 initial request + 2 acks, never a second initial request.
        assert_eq!(sent.len(), 3);
    }

    #[test]
    fn pfc_request_is_rejected_using_peer_session_id() {
        let worker = Worker::new(peer());
        let fake = FakeCaptureHandle::new(vec![]);
        let req = lcp_request(0x07, 1492, true, false, 0);

        worker.handle_pppoes(&req, &fake, adapter());

        let sent = fake.outbound.lock().unwrap();
        let reject = decode_pppoes(codec::parse_ethernet(&sent[1]).unwrap().payload).unwrap();
        assert_eq!(reject.session_id, 0x1234, "reject must echo the peer's own session id");
        match reject.body {
            PppoesBody::Lcp(lcp) => {
                assert_eq!(lcp.code, LinkCode::ConfigReject);
                assert!(lcp.pfc);
            }
            _ => panic!("expected lcp body"),
        }
    }

    #[test]
    fn pap_frame_yields_credentials_without_sending_anything() {
        let worker = Worker::new(peer());
        let fake = FakeCaptureHandle::new(vec![]);
        let pppoes = PPPoES {
            version_and_type: codec::VERSION_AND_TYPE,
            code: SCode::SessionData,
            session_id: 0x0001,
            p2p_protocol: P2P_PAP,
            body: PppoesBody::Pap(codec::PwdAuthProtocol {
                code: 0x01,
                identifier: 0x01,
                peer_id: "alice".to_string(),
                password: "hunter2".to_string(),
            }),
        };

        let creds = worker.handle_pppoes(&pppoes, &fake, adapter()).unwrap();
        assert_eq!(creds.peer_id, "alice");
        assert_eq!(creds.password, "hunter2");
        assert!(fake.outbound.lock().unwrap().is_empty());
    }

    #[test]
    fn non_session_data_code_is_ignored() {
        let worker = Worker::new(peer());
        let fake = FakeCaptureHandle::new(vec![]);
        let pppoes = PPPoES {
            version_and_type: codec::VERSION_AND_TYPE,
            code: SCode::Other(0x42),
            session_id: 0,
            p2p_protocol: 0,
            body: PppoesBody::Other,
        };
        assert!(worker.handle_pppoes(&pppoes, &fake, adapter()).is_none());
        assert!(fake.outbound.lock().unwrap().is_empty());
    }
}
