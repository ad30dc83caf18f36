//! Protocol error types.

use thiserror::Error;

/// Framing-level errors that can occur while stuffing/unstuffing a
/// payload or while building/parsing a packet.
///
/// These are distinct from a device-reported failure (`{"ok": false,
/// "err": "..."}`), which decodes just fine and is surfaced through
/// [`crate::message::ResponseMeta::Err`] instead. A `ProtocolError` means
/// the bytes themselves didn't form a valid frame or packet.
#[derive(Debug, Error, Clone)]
pub enum ProtocolError {
    /// Byte-stuffing decode failed: a code byte claimed more literal
    /// bytes than remained in the input.
    #[error("malformed stuffed frame")]
    MalformedFrame,

    /// The decoded packet body was shorter than the minimum possible
    /// packet (`code` + `json_len` + `crc32` = 7 bytes for an empty-JSON,
    /// no-binary packet).
    #[error("short frame: {len} bytes, need at least 7")]
    ShortFrame { len: usize },

    /// The trailing CRC-32 did not match the one computed over the body.
    #[error("CRC mismatch: expected {expected:#010x}, computed {actual:#010x}")]
    CrcMismatch { expected: u32, actual: u32 },

    /// The JSON region of a packet being built would exceed the 16-bit
    /// length field's range.
    #[error("oversized JSON region: {size} bytes exceeds 0xFFFF")]
    OversizedJson { size: usize },

    /// A JSON value being built for a request could not be serialized.
    /// Framing-adjacent, not a violation of the wire format itself —
    /// the device's own malformed JSON is instead surfaced as a
    /// synthetic `ResponseMeta::Err` (see [`crate::packet::parse`]).
    #[error("JSON error: {0}")]
    Json(String),
}

impl PartialEq for ProtocolError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::MalformedFrame, Self::MalformedFrame) => true,
            (Self::ShortFrame { len: a }, Self::ShortFrame { len: b }) => a == b,
            (
                Self::CrcMismatch {
                    expected: ea,
                    actual: aa,
                },
                Self::CrcMismatch {
                    expected: eb,
                    actual: ab,
                },
            ) => ea == eb && aa == ab,
            (Self::OversizedJson { size: a }, Self::OversizedJson { size: b }) => a == b,
            (Self::Json(a), Self::Json(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for ProtocolError {}

impl From<serde_json::Error> for ProtocolError {
    fn from(err: serde_json::Error) -> Self {
        ProtocolError::Json(err.to_string())
    }
}
