//! Sync Detector: confirms the link is alive by watching for the
//! device's ASCII beacon before any request is sent.

use crate::error::ClientError;
use crate::transport::Transport;
use std::time::{Duration, Instant};
use uftp_protocol::SYNC_BEACON;

const RETRY_SLEEP: Duration = Duration::from_millis(500);
const WINDOW_SIZE: usize = 50;
const DRAIN_QUIET_GAP: Duration = Duration::from_millis(50);

/// Drains pending bytes, then watches a sliding window of raw reads for
/// the beacon substring, retrying up to `retries` times. Never sends a
/// byte of its own — a successful sync proves the host-side TTY is
/// configured correctly and the device is listening, without consuming
/// a request slot.
pub fn detect(transport: &mut Transport, timeout: Duration, retries: u32) -> Result<(), ClientError> {
    transport.reset_accumulator();

    for attempt in 0..retries {
        tracing::debug!(attempt, "waiting for sync beacon");
        if wait_for_beacon(transport, timeout)? {
            tracing::debug!("sync beacon detected");
            return Ok(());
        }
        if attempt + 1 < retries {
            std::thread::sleep(RETRY_SLEEP);
        }
    }

    tracing::warn!(retries, "no sync beacon detected");
    Err(ClientError::SyncFailed { retries })
}

fn wait_for_beacon(transport: &mut Transport, timeout: Duration) -> Result<bool, ClientError> {
    let deadline = Instant::now() + timeout;
    let beacon = SYNC_BEACON.as_bytes();
    let mut window: Vec<u8> = Vec::with_capacity(WINDOW_SIZE + beacon.len());

    loop {
        if Instant::now() >= deadline {
            return Ok(false);
        }

        let byte = match transport.read_one_raw(deadline) {
            Ok(Some(b)) => b,
            Ok(None) => continue,
            Err(e) => return Err(e),
        };

        window.push(byte);
        if window.len() > WINDOW_SIZE {
            let excess = window.len() - WINDOW_SIZE;
            window.drain(..excess);
        }

        if window
            .windows(beacon.len())
            .any(|candidate| candidate == beacon)
        {
            drain_beacon_tail(transport)?;
            return Ok(true);
        }
    }
}

/// The beacon substring is matched on its first four bytes
/// (`UFTE`), but the device's actual line is longer (`UFTE_READY\r\n`).
/// Reading stops as soon as a short quiet gap is seen, so the rest of
/// the line never lingers in the endpoint's input queue to prepend
/// itself onto the first real response frame.
fn drain_beacon_tail(transport: &mut Transport) -> Result<(), ClientError> {
    loop {
        let deadline = Instant::now() + DRAIN_QUIET_GAP;
        match transport.read_one_raw(deadline)? {
            Some(_) => continue,
            None => return Ok(()),
        }
    }
}
