//! Byte-stuffing codec (COBS) used to remove the 0x00 delimiter from a
//! packet before it goes on the wire.
//!
//! ```text
//! block := code:u8 literal:u8[code - 1]
//! stuffed := block+
//! ```
//!
//! Each block's code byte records the distance, in bytes, to the next
//! 0x00 in the *original* payload, capped at 0xFF. A code of 0xFF means
//! "254 literal bytes follow, and there was no zero there" — the next
//! block (if any) continues without an implied zero. Any other code
//! means "`code - 1` literal bytes follow, then (if more input remains)
//! a zero."
//!
//! A run of exactly 254 non-zero bytes ending the input closes out as a
//! single 0xFF block with no further block needed; a run one byte longer
//! spills into a second, short block.

use crate::error::ProtocolError;

/// Encodes `input` into a representation containing no 0x00 byte.
///
/// Empty input encodes to the single byte `[0x01]`.
pub fn encode(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len() + input.len() / 254 + 1);
    out.push(0); // placeholder for the first block's code byte
    let mut code_pos = 0usize;
    let mut code: u8 = 1;
    let mut block_open = true;

    for (i, &byte) in input.iter().enumerate() {
        if byte == 0 {
            out[code_pos] = code;
            code = 1;
            code_pos = out.len();
            out.push(0);
            block_open = true;
        } else {
            out.push(byte);
            code += 1;
            if code == 0xFF {
                out[code_pos] = code;
                block_open = false;
                if i + 1 < input.len() {
                    code = 1;
                    code_pos = out.len();
                    out.push(0);
                    block_open = true;
                }
            }
        }
    }
    if block_open {
        out[code_pos] = code;
    }
    out
}

/// Decodes a COBS-stuffed buffer back into the original payload.
///
/// Fails with [`ProtocolError::MalformedFrame`] if a code byte is zero
/// (the delimiter must already have been stripped by the caller — see
/// the Frame Transport contract) or claims more literal bytes than
/// remain in the input.
pub fn decode(input: &[u8]) -> Result<Vec<u8>, ProtocolError> {
    let mut out = Vec::with_capacity(input.len());
    let mut pos = 0usize;

    while pos < input.len() {
        let code = input[pos];
        if code == 0 {
            return Err(ProtocolError::MalformedFrame);
        }
        let literal_len = (code - 1) as usize;
        let literal_start = pos + 1;
        let literal_end = literal_start + literal_len;
        if literal_end > input.len() {
            return Err(ProtocolError::MalformedFrame);
        }
        out.extend_from_slice(&input[literal_start..literal_end]);

        pos = literal_end;
        if code != 0xFF && pos < input.len() {
            out.push(0);
        }
    }

    Ok(out)
}
