//! File Transfer Loops: chunked PUT (upload) and GET (download) against
//! the remote filesystem.

use crate::engine;
use crate::error::ClientError;
use crate::transport::Transport;
use serde_json::json;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::time::Duration;
use uftp_protocol::Code;

/// Invoked after each chunk with `(transferred, total)`. `total` is
/// always `None` from the core — PUT's total is known locally to the
/// caller via `std::fs::metadata` and GET's is never reported by the
/// device, so there's nothing for the loop itself to thread through.
pub type Progress<'a> = dyn FnMut(u64, Option<u64>) + 'a;

/// Uploads `local` to `remote_path` in `chunk`-sized pieces. The final
/// call carries zero bytes of binary, which the device interprets as
/// end-of-file and commit.
pub fn put(
    transport: &mut Transport,
    timeout: Duration,
    local: &Path,
    remote_path: &str,
    chunk: usize,
    mut progress: Option<&mut Progress>,
) -> Result<(), ClientError> {
    let span = tracing::debug_span!("put", path = remote_path);
    let _enter = span.enter();

    let mut file = File::open(local).map_err(ClientError::LocalIo)?;
    let mut off: u64 = 0;
    let mut buf = vec![0u8; chunk];

    loop {
        let n = file.read(&mut buf).map_err(ClientError::LocalIo)?;
        let body = &buf[..n];

        let params = json!({ "path": remote_path, "off": off });
        let json_bytes = serde_json::to_vec(&params).map_err(|e| ClientError::Protocol(e.into()))?;

        let parsed = engine::request(transport, timeout, Code::Put.as_u8(), &json_bytes, body)?;
        if !parsed.meta.is_ok() {
            let message = parsed.meta.err().unwrap_or("unknown error").to_string();
            tracing::warn!(%message, "put rejected by device");
            return Err(ClientError::RemoteError { message });
        }

        off += n as u64;
        if let Some(cb) = progress.as_mut() {
            cb(off, None);
        }
        tracing::trace!(off, n, "put chunk sent");

        if n == 0 {
            return Ok(());
        }
    }
}

/// Downloads `remote_path` into `local`, overwriting it. A zero-byte
/// local file created by this call is unlinked if the very first
/// request fails, since no bytes were ever committed; once at least one
/// chunk has been written, a later failure leaves the partial file in
/// place as recoverable progress.
pub fn get(
    transport: &mut Transport,
    timeout: Duration,
    remote_path: &str,
    local: &Path,
    mut progress: Option<&mut Progress>,
) -> Result<(), ClientError> {
    let span = tracing::debug_span!("get", path = remote_path);
    let _enter = span.enter();

    let mut file = File::create(local).map_err(ClientError::LocalIo)?;
    let mut off: u64 = 0;
    let mut wrote_any = false;

    loop {
        let params = json!({ "path": remote_path, "off": off });
        let json_bytes = serde_json::to_vec(&params).map_err(|e| ClientError::Protocol(e.into()))?;

        let result = engine::request(transport, timeout, Code::Get.as_u8(), &json_bytes, &[]);
        let parsed = match result {
            Ok(p) => p,
            Err(e) => {
                cleanup_empty_artifact(local, wrote_any);
                return Err(e);
            }
        };

        if !parsed.meta.is_ok() {
            let message = parsed.meta.err().unwrap_or("unknown error").to_string();
            tracing::warn!(%message, "get rejected by device");
            cleanup_empty_artifact(local, wrote_any);
            return Err(ClientError::RemoteError { message });
        }

        let (eof, _bin_len) = match parsed.meta.transfer() {
            Some(t) => t,
            None => (true, None),
        };

        if !parsed.bin.is_empty() {
            file.seek(SeekFrom::Start(off)).map_err(ClientError::LocalIo)?;
            file.write_all(&parsed.bin).map_err(ClientError::LocalIo)?;
            off += parsed.bin.len() as u64;
            wrote_any = true;
            if let Some(cb) = progress.as_mut() {
                cb(off, None);
            }
            tracing::trace!(off, n = parsed.bin.len(), "get chunk received");
        }

        if eof {
            return Ok(());
        }
    }
}

fn cleanup_empty_artifact(local: &Path, wrote_any: bool) {
    if wrote_any {
        return;
    }
    if let Ok(metadata) = std::fs::metadata(local) {
        if metadata.len() == 0 {
            let _ = std::fs::remove_file(local);
        }
    }
}
