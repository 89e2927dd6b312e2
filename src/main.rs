mod archive;
mod commands;
mod config;
mod logger;
mod parser;
mod paths;
mod testutil;

use anyhow::{Context, Result};
use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;

use crate::commands::{dispatch, Outcome, StdinConfirm};
use crate::logger::CommandLog;
use crate::parser::{parse, route, ControlOp, FileOp, Parsed, Route};
use crate::paths::Session;

#[derive(Parser)]
#[command(name = "fsh", about = "Interactive file shell")]
struct Cli {
    /// Alternative config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the command log location
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config_path = match cli.config {
        Some(path) => path,
        None => config::default_config_path()?,
    };
    let mut config = config::load_config(&config_path)?;
    if let Some(log_file) = cli.log_file {
        config.log_file = log_file;
    }

    let log = CommandLog::open(&config.log_file)?;
    let mut session = Session::from_env()?;
    let mut confirm = StdinConfirm;
    let mut editor = DefaultEditor::new().context("failed to initialize line editor")?;

    print_banner();

    let mut empty_count: u32 = 0;
    loop {
        let line = match editor.readline(&config.prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e).context("failed to read input"),
        };

        let cmd = match parse(&line) {
            Parsed::Empty => {
                empty_count += 1;
                if empty_count == config.empty_hint_threshold {
                    println!("Stop hammering the Enter key!");
                    empty_count = 0;
                }
                continue;
            }
            Parsed::Error { message, raw } => {
                empty_count = 0;
                log.record(&raw);
                println!("ERROR: {}", message);
                continue;
            }
            Parsed::Command(cmd) => {
                empty_count = 0;
                cmd
            }
        };

        let _ = editor.add_history_entry(&cmd.raw);
        log.record(&cmd.raw);

        match route(&cmd.name) {
            Route::Control(ControlOp::Exit) => {
                println!("Leaving the shell");
                break;
            }
            Route::Control(ControlOp::Meow) => play_cats(&session),
            Route::Unknown => {
                let message = format!("Unknown command: {}", cmd.name);
                println!("{}", message);
                log.record_failure(&cmd.raw, &message);
            }
            routed => match dispatch(routed, &cmd, &mut session, &mut confirm) {
                Outcome::Quiet => {}
                Outcome::Text(text) => {
                    if !text.is_empty() {
                        println!("{}", text);
                    }
                }
                Outcome::Failure(report) => {
                    println!("{}", report);
                    if mutates_filesystem(routed) {
                        log.record_failure(&cmd.raw, &report);
                    }
                }
            },
        }
    }

    Ok(())
}

fn mutates_filesystem(route: Route) -> bool {
    matches!(
        route,
        Route::File(FileOp::Cd | FileOp::Cp | FileOp::Mv | FileOp::Rm)
    )
}

fn print_banner() {
    println!("<<< fsh >>>\n");
    println!("Available commands: ls, cd, cat, cp, mv, rm, zip, unzip, tar, untar");
    println!("Type 'exit' to quit");
    println!("{}", "~".repeat(20));
}

/// The cats easter egg. Hands `cats.mp4` from the working directory to an
/// external player; everything that can go wrong is conversational, never
/// an `ERROR:` report.
fn play_cats(session: &Session) {
    let video = session.cwd().join("cats.mp4");
    if !video.exists() {
        println!("No cats today: cats.mp4 not found");
        return;
    }

    println!("Playing cats.mp4, press 'q' to quit");
    match std::process::Command::new("mpv").arg(&video).status() {
        Ok(status) if status.success() => {}
        Ok(_) => println!("The cat player exited unhappily"),
        Err(e) => println!("Cannot play cats.mp4: {}", e),
    }
}
