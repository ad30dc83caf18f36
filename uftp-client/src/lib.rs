//! # uftp-client
//!
//! Client library for UFTE, a half-duplex, single-threaded file-transfer
//! protocol spoken over a raw serial link.
//!
//! This crate provides:
//! - A Frame Transport over a real serial port or a loopback pseudo-terminal
//! - A Sync Detector that confirms the link before any request is sent
//! - A strictly serialized Request Engine
//! - Chunked upload/download loops with optional progress callbacks
//! - An owning [`Session`] tying the above together behind a small command surface

pub mod engine;
pub mod error;
pub mod session;
pub mod sync;
pub mod transfer;
pub mod transport;

pub use error::ClientError;
pub use session::{Direction, Session, SessionConfig};
pub use transfer::Progress;
pub use transport::{SerialConfig, Transport};
