//! Owning client session: one serial endpoint driven from one thread.

use crate::engine;
use crate::error::ClientError;
use crate::sync;
use crate::transfer::{self, Progress};
use crate::transport::{SerialConfig, Transport};
use serde_json::json;
use std::path::Path;
use std::time::Duration;
use uftp_protocol::{Code, Entry};

/// Configuration for a [`Session`], layered defaults → config file →
/// CLI overrides upstream of this crate; by the time it reaches here
/// every field is resolved.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub port: String,
    pub baud: u32,
    pub rtscts: bool,
    pub timeout: Duration,
    pub sync_retries: u32,
    pub chunk_size: usize,
}

impl SessionConfig {
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            baud: 115_200,
            rtscts: true,
            timeout: Duration::from_secs(5),
            sync_retries: 3,
            chunk_size: uftp_protocol::DEFAULT_CHUNK_SIZE,
        }
    }

    pub fn with_baud(mut self, baud: u32) -> Self {
        self.baud = baud;
        self
    }

    pub fn with_rtscts(mut self, enabled: bool) -> Self {
        self.rtscts = enabled;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size;
        self
    }
}

/// Direction of a file transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn parse(s: &str) -> Result<Self, ClientError> {
        match s {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            other => Err(ClientError::InvalidArgument {
                message: format!("unknown transfer direction: {other:?}"),
            }),
        }
    }
}

/// One UFTE session: the serial endpoint, the receive accumulator, the
/// configured timeout, and whether the endpoint is a pseudo-terminal.
///
/// This is not safe for concurrent use from multiple threads by design —
/// every method that touches the wire takes `&mut self`, so the borrow
/// checker rejects a second in-flight request from safe code. Sharing a
/// `Session` across threads needs an external `Mutex`.
pub struct Session {
    transport: Transport,
    timeout: Duration,
    chunk_size: usize,
}

impl Session {
    /// Opens the serial port, performs sync detection, and returns a
    /// ready-to-use session. Sync runs at most once per session, before
    /// any request is issued.
    pub fn connect(config: &SessionConfig) -> Result<Self, ClientError> {
        let serial = SerialConfig::new(&config.port, config.baud).with_rtscts(config.rtscts);
        let mut transport = Transport::open(&serial)?;
        sync::detect(&mut transport, config.timeout, config.sync_retries)?;

        Ok(Self {
            transport,
            timeout: config.timeout,
            chunk_size: config.chunk_size,
        })
    }

    /// Test/integration-only entry point: attaches to an already-open
    /// pseudo-terminal device path instead of probing real hardware.
    #[cfg(unix)]
    pub fn connect_pty(path: &str, config: &SessionConfig) -> Result<Self, ClientError> {
        let mut transport = Transport::open_pty(path, config.baud)?;
        sync::detect(&mut transport, config.timeout, config.sync_retries)?;

        Ok(Self {
            transport,
            timeout: config.timeout,
            chunk_size: config.chunk_size,
        })
    }

    /// Changes the device's working directory.
    pub fn cd(&mut self, path: &str) -> Result<(), ClientError> {
        let span = tracing::debug_span!("request", op = "cd");
        let _enter = span.enter();
        self.simple_request(Code::Cd, json!({ "path": path }))
    }

    /// Lists a remote directory.
    pub fn ls(&mut self, path: &str) -> Result<Vec<Entry>, ClientError> {
        let span = tracing::debug_span!("request", op = "ls");
        let _enter = span.enter();

        let params = json!({ "path": path });
        let json_bytes = serde_json::to_vec(&params).map_err(|e| ClientError::Protocol(e.into()))?;
        let parsed = engine::request(&mut self.transport, self.timeout, Code::Ls.as_u8(), &json_bytes, &[])?;

        if !parsed.meta.is_ok() {
            let message = parsed.meta.err().unwrap_or("unknown error").to_string();
            return Err(ClientError::RemoteError { message });
        }
        Ok(parsed.meta.entries().unwrap_or_default().to_vec())
    }

    /// Removes a remote file or directory.
    pub fn rm(&mut self, path: &str) -> Result<(), ClientError> {
        let span = tracing::debug_span!("request", op = "rm");
        let _enter = span.enter();
        self.simple_request(Code::Rm, json!({ "path": path }))
    }

    /// Asks the device to reboot. The device resets shortly after
    /// acknowledging; no further requests should be sent on this session.
    pub fn reboot(&mut self) -> Result<(), ClientError> {
        let span = tracing::debug_span!("request", op = "reboot");
        let _enter = span.enter();
        self.simple_request(Code::Reboot, json!({}))
    }

    /// Uploads or downloads a file, dispatching on `direction`.
    pub fn transfer(
        &mut self,
        direction: Direction,
        local: &Path,
        remote: &str,
        progress: Option<&mut Progress>,
    ) -> Result<(), ClientError> {
        match direction {
            Direction::Up => transfer::put(
                &mut self.transport,
                self.timeout,
                local,
                remote,
                self.chunk_size,
                progress,
            ),
            Direction::Down => transfer::get(&mut self.transport, self.timeout, remote, local, progress),
        }
    }

    /// Closes the endpoint and discards the accumulator.
    pub fn close(self) {
        tracing::debug!("session closed");
    }

    fn simple_request(&mut self, code: Code, params: serde_json::Value) -> Result<(), ClientError> {
        let json_bytes = serde_json::to_vec(&params).map_err(|e| ClientError::Protocol(e.into()))?;
        let parsed = engine::request(&mut self.transport, self.timeout, code.as_u8(), &json_bytes, &[])?;

        if !parsed.meta.is_ok() {
            let message = parsed.meta.err().unwrap_or("unknown error").to_string();
            tracing::warn!(%message, "request rejected by device");
            return Err(ClientError::RemoteError { message });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_parses_up_and_down() {
        assert_eq!(Direction::parse("up").unwrap(), Direction::Up);
        assert_eq!(Direction::parse("down").unwrap(), Direction::Down);
    }

    #[test]
    fn direction_rejects_anything_else() {
        assert!(Direction::parse("sideways").is_err());
    }

    #[test]
    fn session_config_defaults() {
        let config = SessionConfig::new("/dev/ttyUSB0");
        assert_eq!(config.baud, 115_200);
        assert!(config.rtscts);
        assert_eq!(config.chunk_size, uftp_protocol::DEFAULT_CHUNK_SIZE);
    }
}
