//! Loopback test harness: a real PTY pair standing in for the device
//! side of the serial link, plus a scripted fake device that speaks
//! just enough of the wire protocol to exercise [`uftp_client::Session`]
//! end to end without real hardware.

#![cfg(unix)]

use nix::pty::{grantpt, posix_openpt, ptsname_r, unlockpt, PtyMaster};
use nix::sys::termios::{self, SetArg};
use std::collections::HashMap;
use std::io::{Read, Write};
use std::thread::JoinHandle;
use uftp_protocol::{encode_frame, stuffing, Code, DEFAULT_CHUNK_SIZE};

/// Opens a loopback pseudo-terminal pair and puts it in raw mode before
/// anything else touches it, matching the Frame Transport's binary
/// cleanliness requirement (§4.3): canonical-mode input processing
/// (ICRNL, ISIG, ...) would otherwise mangle the exact bytes this suite
/// checks for.
pub fn open_loopback_pty() -> (PtyMaster, String) {
    let master = posix_openpt(nix::fcntl::OFlag::O_RDWR | nix::fcntl::OFlag::O_NOCTTY)
        .expect("posix_openpt");
    grantpt(&master).expect("grantpt");
    unlockpt(&master).expect("unlockpt");
    let slave_path = ptsname_r(&master).expect("ptsname_r");

    let mut term = termios::tcgetattr(&master).expect("tcgetattr");
    termios::cfmakeraw(&mut term);
    termios::tcsetattr(&master, SetArg::TCSANOW, &term).expect("tcsetattr");

    (master, slave_path)
}

/// An in-memory "remote filesystem" the fake device serves `LS`/`GET`/
/// `PUT` against, owned entirely by the device's background thread.
type RemoteFs = HashMap<String, Vec<u8>>;

pub struct FakeDevice {
    handle: Option<JoinHandle<()>>,
}

impl FakeDevice {
    /// Spawns the device loop on a background thread. Writes the sync
    /// beacon (preceded by some garbage bytes) immediately, then
    /// services one request per iteration until the master is closed or
    /// produces a read error, at which point the thread exits.
    pub fn spawn(mut master: PtyMaster) -> Self {
        let mut fs: RemoteFs = HashMap::new();

        let handle = std::thread::spawn(move || {
            let _ = master.write_all(b"\x01\x02garbage-before-beacon");
            let _ = master.write_all(b"UFTE_READY\r\n");

            loop {
                let stuffed = match read_stuffed_frame(&mut master) {
                    Some(f) => f,
                    None => break,
                };
                let body = match stuffing::decode(&stuffed) {
                    Ok(b) => b,
                    Err(_) => continue,
                };
                let Some((code, params, bin)) = parse_request(&body) else {
                    continue;
                };

                let response = handle_request(&mut fs, code, &params, &bin);
                let frame = encode_frame(Code::Resp.as_u8(), &response.0, &response.1)
                    .expect("fake device response always encodes");
                if master.write_all(&frame).is_err() {
                    break;
                }
            }
        });

        FakeDevice {
            handle: Some(handle),
        }
    }
}

impl Drop for FakeDevice {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn read_stuffed_frame(master: &mut PtyMaster) -> Option<Vec<u8>> {
    let mut buf = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        match master.read(&mut byte) {
            Ok(0) => return None,
            Ok(_) => {
                if byte[0] == 0x00 {
                    return Some(buf);
                }
                buf.push(byte[0]);
            }
            Err(_) => return None,
        }
    }
}

/// Manually parses a decoded packet body as a *request* (the
/// `uftp_protocol::packet` module is shaped around parsing responses
/// into `ResponseMeta`, which request JSON like `{"path": ...}` doesn't
/// match).
fn parse_request(body: &[u8]) -> Option<(u8, serde_json::Value, Vec<u8>)> {
    if body.len() < 7 {
        return None;
    }
    let split = body.len() - 4;
    let (payload, crc_bytes) = body.split_at(split);
    let expected = u32::from_be_bytes(crc_bytes.try_into().unwrap());
    if crc32fast::hash(payload) != expected {
        return None;
    }
    let code = payload[0];
    let json_len = u16::from_be_bytes([payload[1], payload[2]]) as usize;
    if 3 + json_len > payload.len() {
        return None;
    }
    let json = &payload[3..3 + json_len];
    let bin = &payload[3 + json_len..];
    let value = serde_json::from_slice(json).ok()?;
    Some((code, value, bin.to_vec()))
}

/// Returns `(json_bytes, bin)` for the device's response to one request.
fn handle_request(fs: &mut RemoteFs, code: u8, params: &serde_json::Value, bin: &[u8]) -> (Vec<u8>, Vec<u8>) {
    let ok_json = |v: serde_json::Value| serde_json::to_vec(&v).unwrap();

    if code == Code::Cd.as_u8() || code == Code::Rm.as_u8() || code == Code::Reboot.as_u8() {
        return (ok_json(serde_json::json!({ "ok": true })), Vec::new());
    }

    if code == Code::Ls.as_u8() {
        let entries = serde_json::json!([
            { "n": "boot.cfg", "t": "f", "s": 42 },
            { "n": "home", "t": "d", "s": 0 },
        ]);
        return (
            ok_json(serde_json::json!({ "ok": true, "entries": entries })),
            Vec::new(),
        );
    }

    if code == Code::Put.as_u8() {
        let path = params["path"].as_str().unwrap_or_default().to_string();
        let off = params["off"].as_u64().unwrap_or(0) as usize;
        if off == 0 {
            fs.insert(path.clone(), Vec::new());
        }
        if !bin.is_empty() {
            let entry = fs.entry(path).or_default();
            if entry.len() < off + bin.len() {
                entry.resize(off + bin.len(), 0);
            }
            entry[off..off + bin.len()].copy_from_slice(bin);
        }
        return (ok_json(serde_json::json!({ "ok": true })), Vec::new());
    }

    if code == Code::Get.as_u8() {
        let path = params["path"].as_str().unwrap_or_default();
        let off = params["off"].as_u64().unwrap_or(0) as usize;
        return match fs.get(path) {
            None => (
                ok_json(serde_json::json!({ "ok": false, "err": "no_such_file" })),
                Vec::new(),
            ),
            Some(data) => {
                let remaining = data.len().saturating_sub(off);
                let take = remaining.min(DEFAULT_CHUNK_SIZE);
                let chunk = data[off..off + take].to_vec();
                let eof = off + take >= data.len();
                (
                    ok_json(serde_json::json!({ "ok": true, "eof": eof, "bin": chunk.len() })),
                    chunk,
                )
            }
        };
    }

    (
        ok_json(serde_json::json!({ "ok": false, "err": "unsupported_command" })),
        Vec::new(),
    )
}
