//! One-shot command execution: each `uftp <subcommand>` invocation maps
//! to exactly one call into [`uftp_client::Session`] (or, for `host`,
//! straight to the local filesystem) and a formatted line of output.

use colored::Colorize;
use std::path::Path;
use uftp_client::{ClientError, Direction, Session};
use uftp_protocol::EntryKind;

use crate::cli::{HostCommand, RemoteCommand, TransferCommand};

pub fn execute_remote(session: &mut Session, cmd: RemoteCommand) -> Result<String, ClientError> {
    match cmd {
        RemoteCommand::Cd { path } => {
            session.cd(&path)?;
            Ok(format!("{} {}", "cd".green(), path.cyan()))
        }
        RemoteCommand::Ls { path } => {
            let entries = session.ls(&path)?;
            Ok(format_entries(&entries))
        }
        RemoteCommand::Rm { path } => {
            session.rm(&path)?;
            Ok(format!("{} {}", "removed".green(), path.cyan()))
        }
    }
}

pub fn execute_reboot(session: &mut Session) -> Result<String, ClientError> {
    session.reboot()?;
    Ok("reboot acknowledged".green().to_string())
}

pub fn execute_transfer(session: &mut Session, cmd: TransferCommand) -> Result<String, ClientError> {
    let (direction, local, remote) = match cmd {
        TransferCommand::Up { local, remote } => (Direction::Up, local, remote),
        TransferCommand::Down { remote, local } => (Direction::Down, local, remote),
    };

    let label = match direction {
        Direction::Up => format!("{} {} -> {}", "put".green(), local.display(), remote.cyan()),
        Direction::Down => format!("{} {} -> {}", "get".green(), remote.cyan(), local.display()),
    };

    let mut progress = |transferred: u64, _total: Option<u64>| {
        eprint!("\r{} {} bytes", "transferred".dimmed(), transferred);
    };
    session.transfer(direction, &local, &remote, Some(&mut progress))?;
    eprintln!();

    Ok(label)
}

pub fn execute_host(cmd: HostCommand) -> Result<String, std::io::Error> {
    match cmd {
        HostCommand::Cd { path } => {
            std::env::set_current_dir(&path)?;
            Ok(format!("{} {}", "cd".green(), path.display()))
        }
        HostCommand::Ls { path } => format_local_dir(&path),
    }
}

fn format_entries(entries: &[uftp_protocol::Entry]) -> String {
    if entries.is_empty() {
        return "(empty)".dimmed().to_string();
    }
    let mut out = String::new();
    for entry in entries {
        let marker = match entry.t {
            EntryKind::Dir => "d".blue(),
            EntryKind::File => "f".normal(),
        };
        out.push_str(&format!("{} {:>10}  {}\n", marker, entry.s, entry.n));
    }
    out.pop();
    out
}

fn format_local_dir(path: &Path) -> Result<String, std::io::Error> {
    let mut rows = Vec::new();
    for entry in std::fs::read_dir(path)? {
        let entry = entry?;
        let metadata = entry.metadata()?;
        let marker = if metadata.is_dir() { "d".blue() } else { "f".normal() };
        rows.push(format!(
            "{} {:>10}  {}",
            marker,
            metadata.len(),
            entry.file_name().to_string_lossy()
        ));
    }
    if rows.is_empty() {
        return Ok("(empty)".dimmed().to_string());
    }
    rows.sort();
    Ok(rows.join("\n"))
}
