//! Wire codec for PPPoE Discovery/Session frames, LCP option TLVs and PAP.
//!
//! Pure decode/encode functions, no I/O. All multibyte integers on the wire
//! are big-endian. Every decode entry point takes a raw byte slice and
//! returns a [`CodecError`] on any length or option-shape violation rather
//! than a partially-filled struct — see `DESIGN.md` for why this is a
//! deliberate departure from the probe this crate is modeled on.

use crate::error::CodecError;
use macaddr::MacAddr6;

/// Fixed PPPoE version/type nibble pair set on every frame this crate emits.
pub const VERSION_AND_TYPE: u8 = 0x11;

/// Default AC name this probe advertises in PADO/PADS.
pub const AC_NAME: &str = "nova-tools";

pub const ETHERTYPE_PPPOE_DISCOVERY: u16 = 0x8863;
pub const ETHERTYPE_PPPOE_SESSION: u16 = 0x8864;

pub const P2P_LCP: u16 = 0xc021;
pub const P2P_PAP: u16 = 0xc023;

const TAG_BASIC: u16 = 0x0101;
const TAG_AC_NAME: u16 = 0x0102;
const TAG_HOST_UNIQ: u16 = 0x0103;
const TAG_AC_COOKIE: u16 = 0x0104;

const OPT_MRU: u8 = 0x01;
const OPT_AUTH_PROTOCOL: u8 = 0x03;
const OPT_MAGIC_NUMBER: u8 = 0x05;
const OPT_PFC: u8 = 0x07;
const OPT_ACFC: u8 = 0x08;
const OPT_CALLBACK: u8 = 0x0d;

/// A parsed Ethernet header plus a borrowed view of its payload.
#[derive(Debug, Clone, Copy)]
pub struct EthernetFrame<'a> {
    pub dst_mac: MacAddr6,
    pub src_mac: MacAddr6,
    pub ethertype: u16,
    pub payload: &'a [u8],
}

/// Parses a 14-byte Ethernet header. Returns `None` on frames too short to
/// carry one — the caller is expected to drop these silently (§4.3: "fail-soft").
pub fn parse_ethernet(bytes: &[u8]) -> Option<EthernetFrame<'_>> {
    if bytes.len() < 14 {
        return None;
    }
    let dst_mac = mac_from_slice(&bytes[0..6]);
    let src_mac = mac_from_slice(&bytes[6..12]);
    let ethertype = u16::from_be_bytes([bytes[12], bytes[13]]);
    Some(EthernetFrame {
        dst_mac,
        src_mac,
        ethertype,
        payload: &bytes[14..],
    })
}

/// Builds a raw Ethernet frame around an already-encoded payload.
pub fn encode_ethernet(dst_mac: MacAddr6, src_mac: MacAddr6, ethertype: u16, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(14 + payload.len());
    out.extend_from_slice(dst_mac.as_bytes());
    out.extend_from_slice(src_mac.as_bytes());
    out.extend_from_slice(&ethertype.to_be_bytes());
    out.extend_from_slice(payload);
    out
}

fn mac_from_slice(bytes: &[u8]) -> MacAddr6 {
    MacAddr6::new(bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5])
}

/// PPPoE Discovery codes (RFC 2516).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DCode {
    Padi,
    Pado,
    Padr,
    Pads,
    Other(u8),
}

impl From<u8> for DCode {
    fn from(v: u8) -> Self {
        match v {
            0x09 => DCode::Padi,
            0x07 => DCode::Pado,
            0x19 => DCode::Padr,
            0x65 => DCode::Pads,
            other => DCode::Other(other),
        }
    }
}

impl From<DCode> for u8 {
    fn from(v: DCode) -> Self {
        match v {
            DCode::Padi => 0x09,
            DCode::Pado => 0x07,
            DCode::Padr => 0x19,
            DCode::Pads => 0x65,
            DCode::Other(v) => v,
        }
    }
}

/// A decoded PPPoE Discovery frame (the frame after the Ethernet header).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PPPoED {
    pub version_and_type: u8,
    pub code: DCode,
    pub session_id: u16,
    pub ac_name: Option<String>,
    pub ac_cookie: Option<Vec<u8>>,
    pub host_uniq: Option<Vec<u8>>,
}

/// Decodes a PPPoE Discovery payload. See §4.1.
pub fn decode_pppoed(bytes: &[u8]) -> Result<PPPoED, CodecError> {
    if bytes.len() < 6 {
        return Err(CodecError::InvalidLength {
            context: "pppoed header",
        });
    }

    let version_and_type = bytes[0];
    let code = DCode::from(bytes[1]);
    let session_id = u16::from_be_bytes([bytes[2], bytes[3]]);
    let payload_len = u16::from_be_bytes([bytes[4], bytes[5]]) as usize;

    let mut p = PPPoED {
        version_and_type,
        code,
        session_id,
        ac_name: None,
        ac_cookie: None,
        host_uniq: None,
    };

    if payload_len == 0 {
        return Ok(p);
    }

    let mut tags = bytes
        .get(6..6 + payload_len)
        .ok_or(CodecError::InvalidLength {
            context: "pppoed payload",
        })?;

    while !tags.is_empty() {
        if tags.len() < 4 {
            return Err(CodecError::InvalidLength {
                context: "pppoed tag header",
            });
        }
        let tag_type = u16::from_be_bytes([tags[0], tags[1]]);
        let tag_len = u16::from_be_bytes([tags[2], tags[3]]) as usize;
        let value = tags.get(4..4 + tag_len).ok_or(CodecError::InvalidLength {
            context: "pppoed tag value",
        })?;

        match tag_type {
            TAG_AC_NAME => {
                p.ac_name = Some(String::from_utf8(value.to_vec()).map_err(|_| {
                    CodecError::InvalidLength {
                        context: "ac_name utf8",
                    }
                })?);
            }
            TAG_HOST_UNIQ => p.host_uniq = Some(value.to_vec()),
            TAG_AC_COOKIE => p.ac_cookie = Some(value.to_vec()),
            _ => {}
        }

        tags = &tags[4 + tag_len..];
    }

    Ok(p)
}

/// Encodes a PPPoE Discovery frame. Tag order is fixed: AcName, Basic
/// (always, zero-length), AcCookie, HostUniq — see §4.1.
pub fn encode_pppoed(p: &PPPoED) -> Vec<u8> {
    let mut tags = Vec::new();

    if let Some(name) = p.ac_name.as_deref().filter(|v| !v.is_empty()) {
        push_tag(&mut tags, TAG_AC_NAME, name.as_bytes());
    }
    push_tag(&mut tags, TAG_BASIC, &[]);
    if let Some(cookie) = p.ac_cookie.as_deref().filter(|v| !v.is_empty()) {
        push_tag(&mut tags, TAG_AC_COOKIE, cookie);
    }
    if let Some(hu) = p.host_uniq.as_deref().filter(|v| !v.is_empty()) {
        push_tag(&mut tags, TAG_HOST_UNIQ, hu);
    }

    let mut out = Vec::with_capacity(6 + tags.len());
    out.push(VERSION_AND_TYPE);
    out.push(p.code.into());
    out.extend_from_slice(&p.session_id.to_be_bytes());
    out.extend_from_slice(&(tags.len() as u16).to_be_bytes());
    out.extend_from_slice(&tags);
    out
}

fn push_tag(buf: &mut Vec<u8>, ty: u16, value: &[u8]) {
    buf.extend_from_slice(&ty.to_be_bytes());
    buf.extend_from_slice(&(value.len() as u16).to_be_bytes());
    buf.extend_from_slice(value);
}

/// PPPoE Session codes. Only `SessionData` is meaningful; everything else
/// passes through as `Other` so encode/decode stay lossless.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SCode {
    SessionData,
    Other(u8),
}

impl From<u8> for SCode {
    fn from(v: u8) -> Self {
        match v {
            0x00 => SCode::SessionData,
            other => SCode::Other(other),
        }
    }
}

impl From<SCode> for u8 {
    fn from(v: SCode) -> Self {
        match v {
            SCode::SessionData => 0x00,
            SCode::Other(v) => v,
        }
    }
}

/// LCP codes (RFC 1661, the subset this probe speaks).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkCode {
    ConfigRequest,
    ConfigAck,
    ConfigNak,
    ConfigReject,
    EchoRequest,
    Other(u8),
}

impl From<u8> for LinkCode {
    fn from(v: u8) -> Self {
        match v {
            0x01 => LinkCode::ConfigRequest,
            0x02 => LinkCode::ConfigAck,
            0x03 => LinkCode::ConfigNak,
            0x04 => LinkCode::ConfigReject,
            0x09 => LinkCode::EchoRequest,
            other => LinkCode::Other(other),
        }
    }
}

impl From<LinkCode> for u8 {
    fn from(v: LinkCode) -> Self {
        match v {
            LinkCode::ConfigRequest => 0x01,
            LinkCode::ConfigAck => 0x02,
            LinkCode::ConfigNak => 0x03,
            LinkCode::ConfigReject => 0x04,
            LinkCode::EchoRequest => 0x09,
            LinkCode::Other(v) => v,
        }
    }
}

/// A decoded LCP sub-frame with its option TLVs already unpacked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkCtrlProtocol {
    pub code: LinkCode,
    pub identifier: u8,
    pub max_receive_unit: u16,
    pub auth_protocol: u16,
    pub magic_number: u32,
    pub pfc: bool,
    pub acfc: bool,
    pub callback_op: u8,
}

/// Decodes an LCP sub-frame (the bytes after the `p2p_protocol` field). See §4.1.
pub fn decode_lcp(payload: &[u8]) -> Result<LinkCtrlProtocol, CodecError> {
    if payload.len() < 4 {
        return Err(CodecError::InvalidLength {
            context: "lcp header",
        });
    }

    let code = LinkCode::from(payload[0]);
    let identifier = payload[1];
    let declared_len = u16::from_be_bytes([payload[2], payload[3]]) as usize;

    let mut lcp = LinkCtrlProtocol {
        code,
        identifier,
        max_receive_unit: 0,
        auth_protocol: 0,
        magic_number: 0,
        pfc: false,
        acfc: false,
        callback_op: 0,
    };

    if declared_len == 0 {
        return Ok(lcp);
    }

    let options_len = declared_len.saturating_sub(4);
    let mut options = payload[4..]
        .get(..options_len)
        .ok_or(CodecError::InvalidLength {
            context: "lcp options",
        })?;

    while !options.is_empty() {
        if options.len() < 2 {
            return Err(CodecError::InvalidLength {
                context: "lcp option header",
            });
        }
        let opt_type = options[0];
        let total_len = options[1] as usize;

        if total_len == 0 {
            // Defensive pad: skip just the 2-byte header.
            options = &options[2..];
            continue;
        }
        if total_len > options.len() {
            return Err(CodecError::InvalidLength {
                context: "lcp option value",
            });
        }
        if total_len < 2 {
            return Err(CodecError::InvalidOption {
                option: "unknown",
                expected: 2,
                actual: total_len,
            });
        }

        match opt_type {
            OPT_MRU => {
                if total_len != 4 {
                    return Err(CodecError::InvalidOption {
                        option: "mru",
                        expected: 4,
                        actual: total_len,
                    });
                }
                lcp.max_receive_unit = u16::from_be_bytes([options[2], options[3]]);
            }
            OPT_AUTH_PROTOCOL => {
                if total_len != 4 {
                    return Err(CodecError::InvalidOption {
                        option: "auth_protocol",
                        expected: 4,
                        actual: total_len,
                    });
                }
                lcp.auth_protocol = u16::from_be_bytes([options[2], options[3]]);
            }
            OPT_MAGIC_NUMBER => {
                if total_len != 6 {
                    return Err(CodecError::InvalidOption {
                        option: "magic_number",
                        expected: 6,
                        actual: total_len,
                    });
                }
                lcp.magic_number =
                    u32::from_be_bytes([options[2], options[3], options[4], options[5]]);
            }
            OPT_CALLBACK => {
                if total_len != 3 {
                    return Err(CodecError::InvalidOption {
                        option: "callback",
                        expected: 3,
                        actual: total_len,
                    });
                }
                lcp.callback_op = options[2];
            }
            OPT_PFC => lcp.pfc = true,
            OPT_ACFC => lcp.acfc = true,
            _ => {}
        }

        options = &options[total_len..];
    }

    Ok(lcp)
}

fn encode_lcp(lcp: &LinkCtrlProtocol, out: &mut Vec<u8>) {
    let mut options = Vec::new();

    if lcp.max_receive_unit > 0 {
        options.push(OPT_MRU);
        options.push(4);
        options.extend_from_slice(&lcp.max_receive_unit.to_be_bytes());
    }
    if lcp.magic_number > 0 {
        options.push(OPT_MAGIC_NUMBER);
        options.push(6);
        options.extend_from_slice(&lcp.magic_number.to_be_bytes());
    }
    if lcp.auth_protocol > 0 {
        options.push(OPT_AUTH_PROTOCOL);
        options.push(4);
        options.extend_from_slice(&lcp.auth_protocol.to_be_bytes());
    }
    if lcp.pfc {
        options.push(OPT_PFC);
        options.push(2);
    }
    if lcp.acfc {
        options.push(OPT_ACFC);
        options.push(2);
    }
    if lcp.callback_op > 0 {
        options.push(OPT_CALLBACK);
        options.push(3);
        options.push(lcp.callback_op);
    }

    out.push(lcp.code.into());
    out.push(lcp.identifier);
    out.extend_from_slice(&((options.len() + 4) as u16).to_be_bytes());
    out.extend_from_slice(&options);
}

/// A decoded PAP sub-frame (RFC 1334).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PwdAuthProtocol {
    pub code: u8,
    pub identifier: u8,
    pub peer_id: String,
    pub password: String,
}

/// Decodes a PAP sub-frame (the bytes after the `p2p_protocol` field). See §4.1.
pub fn decode_pap(payload: &[u8]) -> Result<PwdAuthProtocol, CodecError> {
    if payload.len() < 4 {
        return Err(CodecError::InvalidLength {
            context: "pap header",
        });
    }

    let code = payload[0];
    let identifier = payload[1];
    let declared_len = u16::from_be_bytes([payload[2], payload[3]]) as usize;

    let empty = PwdAuthProtocol {
        code,
        identifier,
        peer_id: String::new(),
        password: String::new(),
    };

    if declared_len == 0 {
        return Ok(empty);
    }

    let data_len = declared_len.saturating_sub(4);
    let data = payload[4..].get(..data_len).ok_or(CodecError::InvalidLength {
        context: "pap data",
    })?;

    if data.is_empty() {
        return Ok(empty);
    }

    let peer_len = data[0] as usize;
    let peer_bytes = data
        .get(1..1 + peer_len)
        .ok_or(CodecError::InvalidLength { context: "pap peer_id" })?;
    let peer_id = String::from_utf8(peer_bytes.to_vec())
        .map_err(|_| CodecError::InvalidLength { context: "pap peer_id utf8" })?;

    let rest = &data[1 + peer_len..];
    if rest.is_empty() {
        return Ok(PwdAuthProtocol {
            code,
            identifier,
            peer_id,
            password: String::new(),
        });
    }

    let pwd_len = rest[0] as usize;
    let pwd_bytes = rest
        .get(1..1 + pwd_len)
        .ok_or(CodecError::InvalidLength { context: "pap password" })?;
    let password = String::from_utf8(pwd_bytes.to_vec())
        .map_err(|_| CodecError::InvalidLength { context: "pap password utf8" })?;

    Ok(PwdAuthProtocol {
        code,
        identifier,
        peer_id,
        password,
    })
}

fn encode_pap(pap: &PwdAuthProtocol, out: &mut Vec<u8>) {
    let mut data = Vec::new();

    if !pap.peer_id.is_empty() {
        data.push(pap.peer_id.len() as u8);
        data.extend_from_slice(pap.peer_id.as_bytes());
    }
    if !pap.password.is_empty() {
        data.push(pap.password.len() as u8);
        data.extend_from_slice(pap.password.as_bytes());
    }

    out.push(pap.code);
    out.push(pap.identifier);
    out.extend_from_slice(&((data.len() + 4) as u16).to_be_bytes());
    out.extend_from_slice(&data);
}

/// The `p2p_protocol`-dependent body of a PPPoES frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PppoesBody {
    Lcp(LinkCtrlProtocol),
    Pap(PwdAuthProtocol),
    /// A `p2p_protocol` this probe doesn't interpret; decoded but not unpacked.
    Other,
}

/// A decoded PPPoE Session frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PPPoES {
    pub version_and_type: u8,
    pub code: SCode,
    pub session_id: u16,
    pub p2p_protocol: u16,
    pub body: PppoesBody,
}

/// Decodes a PPPoE Session payload. See §4.1.
///
/// Unlike the prototype this crate is modeled on, a short inner payload
/// always fails with `InvalidLength` rather than returning a partially
/// filled struct (REDESIGN FLAGS §R1).
pub fn decode_pppoes(bytes: &[u8]) -> Result<PPPoES, CodecError> {
    if bytes.len() < 6 {
        return Err(CodecError::InvalidLength {
            context: "pppoes header",
        });
    }

    let version_and_type = bytes[0];
    let code = SCode::from(bytes[1]);
    let session_id = u16::from_be_bytes([bytes[2], bytes[3]]);
    let payload_len = u16::from_be_bytes([bytes[4], bytes[5]]) as usize;

    if payload_len == 0 {
        return Ok(PPPoES {
            version_and_type,
            code,
            session_id,
            p2p_protocol: 0,
            body: PppoesBody::Other,
        });
    }

    let payload = bytes
        .get(6..6 + payload_len)
        .ok_or(CodecError::InvalidLength {
            context: "pppoes payload",
        })?;

    if payload.len() < 2 {
        return Err(CodecError::InvalidLength {
            context: "pppoes p2p protocol",
        });
    }
    let p2p_protocol = u16::from_be_bytes([payload[0], payload[1]]);
    let inner = &payload[2..];

    if inner.len() < 4 {
        return Err(CodecError::InvalidLength {
            context: "pppoes inner header",
        });
    }

    let body = match p2p_protocol {
        P2P_LCP => PppoesBody::Lcp(decode_lcp(inner)?),
        P2P_PAP => PppoesBody::Pap(decode_pap(inner)?),
        _ => PppoesBody::Other,
    };

    Ok(PPPoES {
        version_and_type,
        code,
        session_id,
        p2p_protocol,
        body,
    })
}

/// Encodes a PPPoE Session frame. The `p2p_protocol` written on the wire is
/// derived from `body`, not from `p.p2p_protocol` — the latter only matters
/// for the `Other` variant, which round-trips it verbatim.
pub fn encode_pppoes(p: &PPPoES) -> Vec<u8> {
    let (proto, inner) = match &p.body {
        PppoesBody::Lcp(lcp) => {
            let mut inner = Vec::new();
            encode_lcp(lcp, &mut inner);
            (P2P_LCP, inner)
        }
        PppoesBody::Pap(pap) => {
            let mut inner = Vec::new();
            encode_pap(pap, &mut inner);
            (P2P_PAP, inner)
        }
        PppoesBody::Other => (p.p2p_protocol, Vec::new()),
    };

    let mut body = Vec::with_capacity(2 + inner.len());
    body.extend_from_slice(&proto.to_be_bytes());
    body.extend_from_slice(&inner);

    let mut out = Vec::with_capacity(6 + body.len());
    out.push(VERSION_AND_TYPE);
    out.push(p.code.into());
    out.extend_from_slice(&p.session_id.to_be_bytes());
    out.extend_from_slice(&(body.len() as u16).to_be_bytes());
    out.extend_from_slice(&body);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn pppoed_header_only_on_zero_length() {
        let bytes = [0x11, 0x09, 0x00, 0x00, 0x00, 0x00];
        let p = decode_pppoed(&bytes).unwrap();
        assert_eq!(p.code, DCode::Padi);
        assert_eq!(p.ac_name, None);
    }

    #[test]
    fn pppoed_short_buffer_is_invalid_length() {
        assert_eq!(
            decode_pppoed(&[0x11, 0x09, 0x00]),
            Err(CodecError::InvalidLength {
                context: "pppoed header"
            })
        );
    }

    #[test]
    fn pppoed_unknown_tag_is_skipped() {
        // PADI with a single unknown tag type 0xbeef, length 2, value [1, 2].
        let mut bytes = vec![0x11, 0x09, 0x00, 0x00];
        bytes.extend_from_slice(&6u16.to_be_bytes());
        bytes.extend_from_slice(&0xbeefu16.to_be_bytes());
        bytes.extend_from_slice(&2u16.to_be_bytes());
        bytes.extend_from_slice(&[1, 2]);
        let p = decode_pppoed(&bytes).unwrap();
        assert_eq!(p.ac_name, None);
        assert_eq!(p.host_uniq, None);
        assert_eq!(p.ac_cookie, None);
    }

    // S1: PADI Ethernet payload from §8.
    #[test]
    fn s1_padi_payload_decodes() {
        let bytes = [0x11, 0x09, 0x00, 0x00, 0x00, 0x04, 0x01, 0x01, 0x00, 0x00];
        let p = decode_pppoed(&bytes).unwrap();
        assert_eq!(p.code, DCode::Padi);
        assert_eq!(p.session_id, 0);
    }

    // S2: PADR with host_uniq and ac_cookie tags, decode then re-encode as PADS.
    #[test]
    fn s2_padr_echoes_tags_into_pads() {
        let padr = PPPoED {
            version_and_type: VERSION_AND_TYPE,
            code: DCode::Padr,
            session_id: 0x0001,
            ac_name: None,
            ac_cookie: Some(vec![0xaa, 0xbb, 0xcc]),
            host_uniq: Some(vec![0x01, 0x02]),
        };
        let wire = encode_pppoed(&padr);
        let decoded = decode_pppoed(&wire).unwrap();
        assert_eq!(decoded.ac_cookie.as_deref(), Some(&[0xaa, 0xbb, 0xcc][..]));
        assert_eq!(decoded.host_uniq.as_deref(), Some(&[0x01, 0x02][..]));

        let pads = PPPoED {
            code: DCode::Pads,
            session_id: decoded.session_id + 1,
            ac_name: Some(AC_NAME.to_string()),
            ..decoded
        };
        assert_eq!(pads.session_id, 0x0002);
    }

    #[test]
    fn lcp_mru_wrong_length_is_invalid_option() {
        // code=ConfigRequest, id=1, declared_len=4 (header only, no MRU bytes)
        // but an MRU option claiming total_len=5.
        let mut bytes = vec![0x01, 0x01];
        bytes.extend_from_slice(&9u16.to_be_bytes()); // 4 header + 5 option bytes
        bytes.extend_from_slice(&[OPT_MRU, 0x05, 0x05, 0xdc, 0x00]);
        assert_eq!(
            decode_lcp(&bytes),
            Err(CodecError::InvalidOption {
                option: "mru",
                expected: 4,
                actual: 5,
            })
        );
    }

    #[test]
    fn lcp_unknown_option_is_skipped() {
        let mut bytes = vec![0x01, 0x01];
        bytes.extend_from_slice(&6u16.to_be_bytes());
        bytes.extend_from_slice(&[0x99, 0x02]);
        let lcp = decode_lcp(&bytes).unwrap();
        assert_eq!(lcp.max_receive_unit, 0);
    }

    #[test]
    fn lcp_round_trip_preserves_fields() {
        let lcp = LinkCtrlProtocol {
            code: LinkCode::ConfigRequest,
            identifier: 0x01,
            max_receive_unit: 1492,
            auth_protocol: P2P_PAP,
            magic_number: 0xdeadbeef,
            pfc: false,
            acfc: false,
            callback_op: 0,
        };
        let mut bytes = Vec::new();
        encode_lcp(&lcp, &mut bytes);
        let decoded = decode_lcp(&bytes).unwrap();
        assert_eq!(decoded, lcp);
    }

    // S4: ConfigRequest with PFC set.
    #[test]
    fn lcp_pfc_round_trips() {
        let lcp = LinkCtrlProtocol {
            code: LinkCode::ConfigRequest,
            identifier: 0x02,
            max_receive_unit: 0,
            auth_protocol: 0,
            magic_number: 0,
            pfc: true,
            acfc: false,
            callback_op: 0,
        };
        let mut bytes = Vec::new();
        encode_lcp(&lcp, &mut bytes);
        let decoded = decode_lcp(&bytes).unwrap();
        assert!(decoded.pfc);
        assert!(!decoded.acfc);
    }

    // S5: PAP capture.
    #[test]
    fn pap_decodes_peer_and_password() {
        let pap = PwdAuthProtocol {
            code: 0x01,
            identifier: 0x01,
            peer_id: "alice".to_string(),
            password: "secret".to_string(),
        };
        let mut bytes = Vec::new();
        encode_pap(&pap, &mut bytes);
        let decoded = decode_pap(&bytes).unwrap();
        assert_eq!(decoded.peer_id, "alice");
        assert_eq!(decoded.password, "secret");
    }

    #[test]
    fn pppoes_short_inner_header_is_invalid_length() {
        let mut bytes = vec![0x11, 0x00, 0x00, 0x01];
        bytes.extend_from_slice(&3u16.to_be_bytes()); // payload_len = 3: p2p_protocol(2) + 1 stray byte
        bytes.extend_from_slice(&P2P_LCP.to_be_bytes());
        bytes.push(0x00);
        assert_eq!(
            decode_pppoes(&bytes),
            Err(CodecError::InvalidLength {
                context: "pppoes inner header"
            })
        );
    }

    #[test]
    fn pppoes_zero_length_is_header_only() {
        let bytes = [0x11, 0x00, 0x00, 0x01, 0x00, 0x00];
        let p = decode_pppoes(&bytes).unwrap();
        assert_eq!(p.body, PppoesBody::Other);
    }

    proptest! {
        #[test]
        fn pppoed_round_trip(
            ac_name in proptest::option::of("[a-zA-Z0-9_-]{0,30}"),
            ac_cookie in proptest::option::of(proptest::collection::vec(any::<u8>(), 0..32)),
            host_uniq in proptest::option::of(proptest::collection::vec(any::<u8>(), 0..32)),
            session_id in any::<u16>(),
        ) {
            let p = PPPoED {
                version_and_type: VERSION_AND_TYPE,
                code: DCode::Pado,
                session_id,
                ac_name: ac_name.filter(|v| !v.is_empty()),
                ac_cookie: ac_cookie.filter(|v| !v.is_empty()),
                host_uniq: host_uniq.filter(|v| !v.is_empty()),
            };
            let wire = encode_pppoed(&p);
            let decoded = decode_pppoed(&wire).unwrap();
            prop_assert_eq!(decoded, p);
        }

        #[test]
        fn lcp_round_trip_prop(
            identifier in any::<u8>(),
            mru in any::<u16>(),
            auth in any::<u16>(),
            magic in any::<u32>(),
            pfc in any::<bool>(),
            acfc in any::<bool>(),
            callback in any::<u8>(),
        ) {
            let lcp = LinkCtrlProtocol {
                code: LinkCode::ConfigRequest,
                identifier,
                max_receive_unit: mru,
                auth_protocol: auth,
                magic_number: magic,
                pfc,
                acfc,
                callback_op: callback,
            };
            let mut bytes = Vec::new();
            encode_lcp(&lcp, &mut bytes);
            let decoded = decode_lcp(&bytes).unwrap();
            prop_assert_eq!(decoded, lcp);
        }
    }
}
