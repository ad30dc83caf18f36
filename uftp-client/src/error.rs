//! Client error types.

use thiserror::Error;

/// Errors surfaced by a [`crate::Session`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// The serial endpoint could not be opened or configured.
    #[error("failed to open serial port: {0}")]
    OpenFailed(#[source] serialport::Error),

    /// No sync beacon was seen within the configured retries.
    #[error("no sync beacon detected after {retries} attempt(s)")]
    SyncFailed { retries: u32 },

    /// The underlying serial link failed.
    #[error("serial I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No frame delimiter arrived before the deadline.
    #[error("timed out waiting for a response frame")]
    ReadTimeout,

    /// The wire-level codec rejected a frame or packet.
    #[error("protocol error: {0}")]
    Protocol(#[from] uftp_protocol::ProtocolError),

    /// The device responded with `{"ok": false, ...}`.
    #[error("device reported an error: {message}")]
    RemoteError { message: String },

    /// Local API misuse — the caller passed something the core rejects
    /// outright rather than sending to the device.
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// A local file operation (not the serial link) failed.
    #[error("local file error: {0}")]
    LocalIo(#[source] std::io::Error),
}
