//! uftp - PC-side client for the UFTE serial file-transfer protocol.

mod cli;
mod commands;
mod config;
mod shell;

use clap::Parser;
use cli::{Cli, Command};
use colored::Colorize;
use tracing_subscriber::EnvFilter;
use uftp_client::Session;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Command::Shell => {
            let config = config::resolve(&cli)?;
            shell::run(&config)
        }
        Command::Host { cmd } => Ok(println!("{}", commands::execute_host(cmd)?)),
        Command::Remote { cmd } => {
            let config = config::resolve(&cli)?;
            let mut session = Session::connect(&config)?;
            let output = commands::execute_remote(&mut session, cmd)?;
            session.close();
            println!("{output}");
            Ok(())
        }
        Command::Transfer { cmd } => {
            let config = config::resolve(&cli)?;
            let mut session = Session::connect(&config)?;
            let output = commands::execute_transfer(&mut session, cmd)?;
            session.close();
            println!("{output}");
            Ok(())
        }
        Command::Reboot => {
            let config = config::resolve(&cli)?;
            let mut session = Session::connect(&config)?;
            let output = commands::execute_reboot(&mut session)?;
            session.close();
            println!("{output}");
            Ok(())
        }
    }
}

/// `-v` raises the default level one step at a time: warn -> info ->
/// debug -> trace, matching the verbosity convention used elsewhere in
/// this codebase's binaries.
fn init_tracing(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
}
