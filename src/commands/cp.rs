use anyhow::{Context, Result};
use std::path::Path;

use super::{aggregate, err, Outcome};
use crate::paths::{Expect, Session};

struct CpArgs {
    sources: Vec<String>,
    destination: String,
    recursive: bool,
}

/// The final non-flag token is the destination; every earlier non-flag
/// token is a source. Unknown flags fail the whole command before any
/// filesystem action.
fn parse_args(args: &[String]) -> Result<CpArgs, String> {
    let mut recursive = false;
    let mut operands = Vec::new();

    for arg in args {
        if arg.starts_with('-') {
            if arg == "-r" {
                recursive = true;
            } else {
                return Err(err(format!("incorrect option {}", arg)));
            }
        } else {
            operands.push(arg.clone());
        }
    }

    let Some(destination) = operands.pop() else {
        return Err(err("'cp' requires source and destination"));
    };
    if operands.is_empty() {
        return Err(err("'cp' requires source and destination"));
    }

    Ok(CpArgs {
        sources: operands,
        destination,
        recursive,
    })
}

pub fn cp(session: &Session, args: &[String]) -> Outcome {
    let parsed = match parse_args(args) {
        Ok(parsed) => parsed,
        Err(failure) => return Outcome::Failure(failure),
    };

    // checked up front so a bad destination rejects every source
    if parsed.sources.len() > 1
        && session
            .resolve(Some(parsed.destination.as_str()), Expect::Dir)
            .is_none()
    {
        return Outcome::Failure(err(
            "multiple sources require an existing directory destination",
        ));
    }

    let mut failures = Vec::new();
    for source in &parsed.sources {
        if let Err(line) = copy_item(session, source, &parsed.destination, parsed.recursive) {
            failures.push(line);
        }
    }
    aggregate(failures)
}

fn copy_item(
    session: &Session,
    source: &str,
    destination: &str,
    recursive: bool,
) -> Result<(), String> {
    let Some(source_path) = session.resolve(Some(source), Expect::Exists) else {
        return Err(err(format!("source '{}' does not exist", source)));
    };

    let mut target = session.resolve_any(Some(destination));
    if target.is_dir() {
        let Some(name) = source_path.file_name() else {
            return Err(err(format!("source '{}' has no usable file name", source)));
        };
        target = target.join(name);
    }

    if source_path == target {
        return Err(err("source and destination are the same"));
    }

    if source_path.is_dir() {
        if target.starts_with(&source_path) {
            return Err(err("cannot copy a directory into itself"));
        }
        if !recursive {
            return Err(err(format!("'{}' is a directory (use -r)", source)));
        }
        if target.exists() {
            return Err(err(format!(
                "destination '{}' already exists",
                target.display()
            )));
        }
        copy_tree(&source_path, &target).map_err(|e| err(format!("{:#}", e)))
    } else {
        copy_file(&source_path, &target).map_err(|e| err(format!("{:#}", e)))
    }
}

/// `fs::copy` carries permissions but not timestamps; the modification
/// time is copied separately.
fn copy_file(source: &Path, target: &Path) -> Result<()> {
    std::fs::copy(source, target).with_context(|| {
        format!(
            "failed to copy '{}' to '{}'",
            source.display(),
            target.display()
        )
    })?;
    copy_mtime(source, target)
}

fn copy_tree(source: &Path, target: &Path) -> Result<()> {
    std::fs::create_dir_all(target)
        .with_context(|| format!("failed to create '{}'", target.display()))?;

    let entries = std::fs::read_dir(source)
        .with_context(|| format!("cannot list directory {}", source.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("cannot list directory {}", source.display()))?;
        let from = entry.path();
        let to = target.join(entry.file_name());
        if entry
            .file_type()
            .with_context(|| format!("cannot stat {}", from.display()))?
            .is_dir()
        {
            copy_tree(&from, &to)?;
        } else {
            copy_file(&from, &to)?;
        }
    }

    copy_mtime(source, target)
}

fn copy_mtime(source: &Path, target: &Path) -> Result<()> {
    let meta = std::fs::metadata(source)
        .with_context(|| format!("cannot stat {}", source.display()))?;
    if let Ok(modified) = meta.modified() {
        let file = std::fs::File::open(target)
            .with_context(|| format!("cannot open {}", target.display()))?;
        file.set_modified(modified)
            .with_context(|| format!("cannot set times on {}", target.display()))?;
    }
    Ok(())
}
