//! Command-line argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "uftp")]
#[command(about = "PC-side client for the UFTE serial file-transfer protocol")]
#[command(version)]
pub struct Cli {
    /// Serial device path, e.g. /dev/ttyUSB0 or COM3
    #[arg(long)]
    pub port: Option<String>,

    /// Baud rate
    #[arg(long)]
    pub baud: Option<u32>,

    /// Hardware RTS/CTS flow control (defaults to enabled)
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub rtscts: Option<bool>,

    /// Per-request timeout, in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Path to a TOML config file (defaults to $UFTP_CONFIG or ~/.config/uftp/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (repeatable: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start an interactive shell
    Shell,

    /// Remote filesystem operations on the device
    Remote {
        #[command(subcommand)]
        cmd: RemoteCommand,
    },

    /// Local filesystem operations, for shell ergonomics only (no device round trip)
    Host {
        #[command(subcommand)]
        cmd: HostCommand,
    },

    /// Upload or download a file
    Transfer {
        #[command(subcommand)]
        cmd: TransferCommand,
    },

    /// Ask the device to reboot
    Reboot,
}

#[derive(Subcommand)]
pub enum RemoteCommand {
    /// Change the device's working directory
    Cd { path: String },
    /// List a remote directory
    Ls { path: String },
    /// Remove a remote file or directory
    Rm { path: String },
}

#[derive(Subcommand)]
pub enum HostCommand {
    /// Change this process's working directory
    Cd { path: PathBuf },
    /// List a local directory
    Ls { path: PathBuf },
}

#[derive(Subcommand)]
pub enum TransferCommand {
    /// Upload a local file to the device
    Up { local: PathBuf, remote: String },
    /// Download a remote file to the local filesystem
    Down { remote: String, local: PathBuf },
}
