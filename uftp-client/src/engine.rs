//! Request Engine: one call in, one response out, strictly serialized.

use crate::error::ClientError;
use crate::transport::Transport;
use std::time::{Duration, Instant};
use uftp_protocol::{decode_frame, encode_frame, Parsed};

/// Writes one encoded request frame and reads back exactly one response
/// frame.
///
/// Single-outstanding-request discipline is structural: this takes
/// `&mut Transport`, so the borrow checker — not a runtime lock — rejects
/// a second concurrent call from safe code in one thread. The engine
/// does not correlate request/response IDs; a response is assumed to
/// belong to the most recently sent request, which holds because the
/// device never sends unsolicited frames outside the sync beacon.
pub fn request(
    transport: &mut Transport,
    timeout: Duration,
    code: u8,
    json: &[u8],
    bin: &[u8],
) -> Result<Parsed, ClientError> {
    let frame = encode_frame(code, json, bin)?;
    let stuffed = &frame[..frame.len() - 1];

    transport.write_frame(stuffed)?;

    let deadline = Instant::now() + timeout;
    let body_stuffed = transport.read_frame(deadline)?;
    let parsed = decode_frame(&body_stuffed)?;

    Ok(parsed)
}
