//! Interactive shell: a `rustyline` REPL driving one [`Session`] for
//! the lifetime of the process.

use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{Config, Editor};
use std::path::PathBuf;
use uftp_client::{Direction, Session, SessionConfig};

const HELP_TEXT: &str = r#"
Available commands:
  cd <path>                 Change the device's working directory
  ls <path>                 List a remote directory
  rm <path>                 Remove a remote file or directory
  get <remote> <local>      Download a file
  put <local> <remote>      Upload a file
  reboot                    Ask the device to reboot

  host-cd <path>            Change this shell's local working directory
  host-ls <path>            List a local directory

  help                      Show this help
  quit, exit                Exit the shell
"#;

pub fn run(config: &SessionConfig) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", "uftp shell".bold().cyan());
    println!("Connecting to {} at {} baud...", config.port, config.baud);

    let mut session = Session::connect(config)?;
    println!("{}", "Connected.".green());
    println!("Type 'help' for available commands.\n");

    let rl_config = Config::builder()
        .history_ignore_space(true)
        .auto_add_history(true)
        .build();
    let mut rl: Editor<(), DefaultHistory> = Editor::with_config(rl_config)?;

    let history_path = history_path();
    let _ = rl.load_history(&history_path);

    loop {
        let prompt = format!("{} ", "uftp>".cyan());
        match rl.readline(&prompt) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match dispatch(&mut session, line) {
                    Ok(Some(output)) => println!("{}\n", output),
                    Ok(None) => break,
                    Err(e) => println!("{}: {}\n", "Error".red(), e),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("^D");
                break;
            }
            Err(err) => {
                println!("{}: {:?}", "Error".red(), err);
                break;
            }
        }
    }

    let _ = rl.save_history(&history_path);
    session.close();
    println!("{}", "Disconnected.".dimmed());
    Ok(())
}

fn dispatch(session: &mut Session, line: &str) -> Result<Option<String>, Box<dyn std::error::Error>> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let cmd = parts[0];
    let args = &parts[1..];

    match cmd {
        "help" | "?" => Ok(Some(HELP_TEXT.to_string())),
        "quit" | "exit" | "q" => Ok(None),

        "cd" => {
            let path = require_arg(args, 0, "cd <path>")?;
            session.cd(path)?;
            Ok(Some(format!("{} {}", "cd".green(), path)))
        }

        "ls" => {
            let path = args.first().copied().unwrap_or("/");
            let entries = session.ls(path)?;
            if entries.is_empty() {
                return Ok(Some("(empty)".dimmed().to_string()));
            }
            let mut out = String::new();
            for entry in &entries {
                out.push_str(&format!("{:>10}  {}\n", entry.s, entry.n));
            }
            out.pop();
            Ok(Some(out))
        }

        "rm" => {
            let path = require_arg(args, 0, "rm <path>")?;
            session.rm(path)?;
            Ok(Some(format!("{} {}", "removed".green(), path)))
        }

        "reboot" => {
            session.reboot()?;
            Ok(Some("reboot acknowledged".green().to_string()))
        }

        "get" => {
            let remote = require_arg(args, 0, "get <remote> <local>")?;
            let local = require_arg(args, 1, "get <remote> <local>")?;
            session.transfer(Direction::Down, &PathBuf::from(local), remote, None)?;
            Ok(Some(format!("{} {} -> {}", "got".green(), remote, local)))
        }

        "put" => {
            let local = require_arg(args, 0, "put <local> <remote>")?;
            let remote = require_arg(args, 1, "put <local> <remote>")?;
            session.transfer(Direction::Up, &PathBuf::from(local), remote, None)?;
            Ok(Some(format!("{} {} -> {}", "put".green(), local, remote)))
        }

        "host-cd" => {
            let path = require_arg(args, 0, "host-cd <path>")?;
            std::env::set_current_dir(path)?;
            Ok(Some(format!("{} {}", "cd".green(), path)))
        }

        "host-ls" => {
            let path = args.first().copied().unwrap_or(".");
            let mut rows = Vec::new();
            for entry in std::fs::read_dir(path)? {
                let entry = entry?;
                rows.push(entry.file_name().to_string_lossy().into_owned());
            }
            rows.sort();
            Ok(Some(rows.join("\n")))
        }

        other => Ok(Some(format!(
            "Unknown command: {}. Type 'help' for help.",
            other
        ))),
    }
}

fn require_arg<'a>(args: &[&'a str], index: usize, usage: &str) -> Result<&'a str, Box<dyn std::error::Error>> {
    args.get(index)
        .copied()
        .ok_or_else(|| format!("usage: {usage}").into())
}

fn history_path() -> PathBuf {
    home::home_dir()
        .map(|h| h.join(".uftp_history"))
        .unwrap_or_else(|| PathBuf::from(".uftp_history"))
}
