use std::io::{self, BufRead, Write};

use super::{aggregate, err, Outcome};
use crate::paths::{is_safe_path, Expect, Session};

/// Yes/no question asked before a recursive directory removal. Abstracted
/// so non-interactive callers can script the answer.
pub trait Confirm {
    fn confirm(&mut self, target: &str) -> bool;
}

/// Blocks the interpreter on console input. End-of-input or a read error
/// counts as "no".
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, target: &str) -> bool {
        print!("Remove directory '{}'? (y/n): ", target);
        let _ = io::stdout().flush();

        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(0) | Err(_) => {
                println!();
                false
            }
            Ok(_) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
        }
    }
}

pub fn rm(session: &Session, args: &[String], confirm: &mut dyn Confirm) -> Outcome {
    if args.is_empty() {
        return Outcome::Failure(err("'rm' requires at least one argument"));
    }

    let mut recursive = false;
    let mut targets = Vec::new();
    for arg in args {
        if arg.starts_with('-') {
            if arg == "-r" {
                recursive = true;
            } else {
                return Outcome::Failure(err(format!("incorrect option {}", arg)));
            }
        } else {
            targets.push(arg.as_str());
        }
    }
    if targets.is_empty() {
        return Outcome::Failure(err("no targets specified"));
    }

    let mut failures = Vec::new();
    for target in targets {
        if let Err(line) = remove_item(session, target, recursive, confirm) {
            failures.push(line);
        }
    }
    aggregate(failures)
}

fn remove_item(
    session: &Session,
    target: &str,
    recursive: bool,
    confirm: &mut dyn Confirm,
) -> Result<(), String> {
    let Some(path) = session.resolve(Some(target), Expect::Exists) else {
        return Err(err(format!("'{}' does not exist", target)));
    };

    if !is_safe_path(session, &path) {
        return Err(err(format!("cannot remove system directory '{}'", target)));
    }

    if path.is_dir() {
        if !recursive {
            return Err(err(format!("'{}' is a directory (use -r)", target)));
        }
        // a declined confirmation is a cancellation, not an error
        if !confirm.confirm(target) {
            return Err(format!("Cancelled: '{}'", target));
        }
        std::fs::remove_dir_all(&path)
            .map_err(|e| err(format!("cannot remove '{}': {}", target, e)))
    } else {
        std::fs::remove_file(&path).map_err(|e| err(format!("cannot remove '{}': {}", target, e)))
    }
}
