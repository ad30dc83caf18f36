//! # uftp-protocol
//!
//! Wire protocol for UFTE, the serial file-transfer protocol spoken
//! between this client and a small embedded device.
//!
//! This crate provides:
//! - Byte-stuffing (COBS) to remove the 0x00 frame delimiter from a payload
//! - CRC-32 (IEEE 802.3) checked, length-prefixed packet framing
//! - JSON response modeling via a typed, internally-untagged enum

pub mod error;
pub mod message;
pub mod packet;
pub mod stuffing;

pub use error::ProtocolError;
pub use message::{Code, Entry, EntryKind, ResponseMeta};
pub use packet::{build as build_packet, parse as parse_packet, Parsed};

/// The ASCII beacon substring the device emits during its boot/idle
/// window, used by the Sync Detector to confirm the link is alive.
pub const SYNC_BEACON: &str = "UFTE";

/// Default chunk size, in bytes, used by the file transfer loops.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Frame delimiter byte. Never appears inside a correctly stuffed frame.
pub const FRAME_DELIMITER: u8 = 0x00;

/// Builds a stuffed, delimited frame ready to write to the wire.
pub fn encode_frame(code: u8, json: &[u8], bin: &[u8]) -> Result<Vec<u8>, ProtocolError> {
    let packet = packet::build(code, json, bin)?;
    let mut frame = stuffing::encode(&packet);
    frame.push(FRAME_DELIMITER);
    Ok(frame)
}

/// Decodes a stuffed frame (delimiter already stripped by the Frame
/// Transport) into a parsed packet.
pub fn decode_frame(stuffed: &[u8]) -> Result<Parsed, ProtocolError> {
    let packet = stuffing::decode(stuffed)?;
    packet::parse(&packet)
}
