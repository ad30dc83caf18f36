//! Layered configuration for serial-port parameters.
//!
//! Precedence, lowest to highest: built-in defaults, an optional TOML
//! config file, then explicit CLI flags. This mirrors the
//! defaults-then-file-then-overrides shape this codebase already uses
//! for its server configuration, adapted from YAML+env to TOML+CLI —
//! a one-shot client process has no long-running environment to source
//! env vars from beyond the invocation itself.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use uftp_client::SessionConfig;

use crate::cli::Cli;

const DEFAULT_BAUD: u32 = 115_200;
const DEFAULT_TIMEOUT_SECS: u64 = 5;
const DEFAULT_RTSCTS: bool = true;
const DEFAULT_SYNC_RETRIES: u32 = 3;

/// The subset of [`SessionConfig`] fields a TOML file may set. All
/// fields are optional; anything left unset falls through to the
/// built-in default, then may still be overridden by a CLI flag.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub port: Option<String>,
    pub baud: Option<u32>,
    pub timeout_secs: Option<u64>,
    pub rtscts: Option<bool>,
    pub sync_retries: Option<u32>,
    pub chunk_size: Option<usize>,
}

impl FileConfig {
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        toml::from_str(&text).map_err(|e| ConfigError::Parse(path.to_path_buf(), e.to_string()))
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, String),
    NotFound(PathBuf),
    MissingPort,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => {
                write!(f, "failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::Parse(path, e) => {
                write!(f, "failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::NotFound(path) => {
                write!(f, "config file '{}' does not exist", path.display())
            }
            ConfigError::MissingPort => write!(
                f,
                "no serial port specified; pass --port or set `port` in the config file"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Resolves a [`SessionConfig`] from defaults, an optional config file,
/// and the parsed CLI flags, in that precedence order.
///
/// The config file is located by `--config`, then by `UFTP_CONFIG`, and
/// is only an error to be missing or malformed if one of those was set
/// explicitly — an implicit default location that doesn't exist is
/// treated as "no file", not a failure.
pub fn resolve(cli: &Cli) -> Result<SessionConfig, ConfigError> {
    let (path, explicit) = match (&cli.config, std::env::var("UFTP_CONFIG")) {
        (Some(p), _) => (Some(p.clone()), true),
        (None, Ok(p)) => (Some(PathBuf::from(p)), true),
        (None, Err(_)) => (default_config_path(), false),
    };

    let file = match path {
        Some(p) if p.exists() => FileConfig::load(&p)?,
        Some(p) if explicit => return Err(ConfigError::NotFound(p)),
        _ => FileConfig::default(),
    };

    let port = cli
        .port
        .clone()
        .or(file.port)
        .ok_or(ConfigError::MissingPort)?;

    let baud = cli.baud.or(file.baud).unwrap_or(DEFAULT_BAUD);
    let rtscts = cli.rtscts.or(file.rtscts).unwrap_or(DEFAULT_RTSCTS);
    let timeout_secs = cli.timeout.or(file.timeout_secs).unwrap_or(DEFAULT_TIMEOUT_SECS);
    let sync_retries = file.sync_retries.unwrap_or(DEFAULT_SYNC_RETRIES);
    let chunk_size = file.chunk_size.unwrap_or(uftp_protocol::DEFAULT_CHUNK_SIZE);

    let mut config = SessionConfig::new(port)
        .with_baud(baud)
        .with_rtscts(rtscts)
        .with_timeout(Duration::from_secs(timeout_secs))
        .with_chunk_size(chunk_size);
    config.sync_retries = sync_retries;
    Ok(config)
}

fn default_config_path() -> Option<PathBuf> {
    home::home_dir().map(|h| h.join(".config").join("uftp").join("config.toml"))
}
