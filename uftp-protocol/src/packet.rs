//! Packet codec: the CRC-checked, length-prefixed body carried inside a
//! stuffed frame.
//!
//! ```text
//! packet := code:u8 json_len:u16be json:u8[json_len] binary:u8[*] crc32:u32be
//! ```
//!
//! `crc32` is computed over every byte from `code` through the last
//! binary byte (the IEEE 802.3 polynomial — the variant everyone just
//! calls "CRC-32", not Castagnoli).

use crate::error::ProtocolError;
use crate::message::ResponseMeta;

const CRC_LEN: usize = 4;
const HEADER_LEN: usize = 1 + 2; // code + json_len
const MIN_PACKET_LEN: usize = HEADER_LEN + CRC_LEN;

/// Builds a packet body: `code || json_len || json || bin? || crc32`.
///
/// Fails with [`ProtocolError::OversizedJson`] if `json` is longer than
/// a `u16` can address.
pub fn build(code: u8, json: &[u8], bin: &[u8]) -> Result<Vec<u8>, ProtocolError> {
    if json.len() > u16::MAX as usize {
        return Err(ProtocolError::OversizedJson { size: json.len() });
    }

    let mut out = Vec::with_capacity(HEADER_LEN + json.len() + bin.len() + CRC_LEN);
    out.push(code);
    out.extend_from_slice(&(json.len() as u16).to_be_bytes());
    out.extend_from_slice(json);
    out.extend_from_slice(bin);

    let crc = crc32fast::hash(&out);
    out.extend_from_slice(&crc.to_be_bytes());
    Ok(out)
}

/// A parsed, CRC-verified packet.
#[derive(Debug, Clone)]
pub struct Parsed {
    pub code: u8,
    pub meta: ResponseMeta,
    pub bin: Vec<u8>,
}

/// Parses a CRC-verified decoded packet body.
///
/// On a malformed JSON region, this does not fail the parse — it
/// returns a synthetic `{"ok": false, "err": "bad_json"}` metadata
/// object, since a response the device sent but mangled in its own
/// encoding is a protocol-level failure at the application layer, not a
/// framing failure.
pub fn parse(body: &[u8]) -> Result<Parsed, ProtocolError> {
    if body.len() < MIN_PACKET_LEN {
        return Err(ProtocolError::ShortFrame { len: body.len() });
    }

    let split = body.len() - CRC_LEN;
    let (payload, crc_bytes) = body.split_at(split);
    let expected = u32::from_be_bytes(crc_bytes.try_into().expect("4 bytes"));
    let actual = crc32fast::hash(payload);
    if expected != actual {
        return Err(ProtocolError::CrcMismatch { expected, actual });
    }

    let code = payload[0];
    let json_len = u16::from_be_bytes([payload[1], payload[2]]) as usize;
    if HEADER_LEN + json_len > payload.len() {
        return Err(ProtocolError::ShortFrame { len: body.len() });
    }
    let json = &payload[HEADER_LEN..HEADER_LEN + json_len];
    let bin = &payload[HEADER_LEN + json_len..];

    let meta = serde_json::from_slice(json).unwrap_or(ResponseMeta::Err {
        ok: false,
        err: "bad_json".to_string(),
    });

    Ok(Parsed {
        code,
        meta,
        bin: bin.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Code;

    #[test]
    fn build_then_parse_roundtrips() {
        let json = br#"{"path":"/boot.cfg"}"#;
        let packet = build(Code::Cd.as_u8(), json, &[]).unwrap();
        let parsed = parse(&packet).unwrap();
        assert_eq!(parsed.code, Code::Cd.as_u8());
        assert!(parsed.bin.is_empty());
    }

    #[test]
    fn build_then_parse_with_binary() {
        let json = br#"{"path":"/a.bin","off":0}"#;
        let bin = vec![1u8, 2, 3, 4, 5];
        let packet = build(Code::Put.as_u8(), json, &bin).unwrap();
        let parsed = parse(&packet).unwrap();
        assert_eq!(parsed.bin, bin);
    }

    #[test]
    fn oversized_json_is_rejected() {
        let json = vec![b'a'; u16::MAX as usize + 1];
        let err = build(0x12, &json, &[]).unwrap_err();
        assert!(matches!(err, ProtocolError::OversizedJson { .. }));
    }

    #[test]
    fn short_body_is_rejected() {
        let err = parse(&[0x01, 0x02]).unwrap_err();
        assert!(matches!(err, ProtocolError::ShortFrame { .. }));
    }

    #[test]
    fn corrupted_crc_is_rejected() {
        let mut packet = build(Code::Ls.as_u8(), br#"{"path":"/"}"#, &[]).unwrap();
        let last = packet.len() - 1;
        packet[last] ^= 0xFF;
        let err = parse(&packet).unwrap_err();
        assert!(matches!(err, ProtocolError::CrcMismatch { .. }));
    }

    #[test]
    fn malformed_json_yields_synthetic_error_meta_not_a_parse_failure() {
        let mut out = vec![Code::Resp.as_u8()];
        let bad_json = b"{not json";
        out.extend_from_slice(&(bad_json.len() as u16).to_be_bytes());
        out.extend_from_slice(bad_json);
        let crc = crc32fast::hash(&out);
        out.extend_from_slice(&crc.to_be_bytes());

        let parsed = parse(&out).unwrap();
        assert!(!parsed.meta.is_ok());
        assert_eq!(parsed.meta.err(), Some("bad_json"));
    }
}
