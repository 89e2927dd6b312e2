use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::path::Path;
use std::time::SystemTime;

use super::{err, Outcome};
use crate::paths::{Expect, Session};

struct LsArgs {
    detailed: bool,
    path: Option<String>,
}

struct Entry {
    name: String,
    is_dir: bool,
    size: u64,
    modified: SystemTime,
}

fn parse_args(args: &[String]) -> Result<LsArgs, String> {
    let mut detailed = false;
    let mut path = None;

    for arg in args {
        if arg.starts_with('-') {
            if arg == "-l" {
                detailed = true;
            } else {
                return Err(err(format!("incorrect option {}", arg)));
            }
        } else {
            path = Some(arg.clone());
        }
    }

    Ok(LsArgs { detailed, path })
}

pub fn ls(session: &Session, args: &[String]) -> Outcome {
    let parsed = match parse_args(args) {
        Ok(parsed) => parsed,
        Err(failure) => return Outcome::Failure(failure),
    };

    let Some(dir) = session.resolve(parsed.path.as_deref(), Expect::Dir) else {
        return Outcome::Failure(err("path does not exist or is not a directory"));
    };

    match read_entries(&dir) {
        Ok(entries) => {
            let text = if parsed.detailed {
                format_detailed(&entries)
            } else {
                format_simple(&entries)
            };
            Outcome::Text(text)
        }
        Err(e) => Outcome::Failure(err(format!("{:#}", e))),
    }
}

fn read_entries(dir: &Path) -> Result<Vec<Entry>> {
    let mut entries = Vec::new();

    let iter = std::fs::read_dir(dir)
        .with_context(|| format!("cannot list directory {}", dir.display()))?;
    for entry in iter {
        let entry = entry.with_context(|| format!("cannot list directory {}", dir.display()))?;
        let meta = entry
            .metadata()
            .with_context(|| format!("cannot stat {}", entry.path().display()))?;
        entries.push(Entry {
            name: entry.file_name().to_string_lossy().into_owned(),
            is_dir: meta.is_dir(),
            size: meta.len(),
            modified: meta.modified().unwrap_or(SystemTime::UNIX_EPOCH),
        });
    }

    entries.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    Ok(entries)
}

fn format_simple(entries: &[Entry]) -> String {
    entries
        .iter()
        .map(|e| e.name.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_detailed(entries: &[Entry]) -> String {
    let mut lines = Vec::new();
    for entry in entries {
        let marker = if entry.is_dir { 'd' } else { '-' };
        let mtime: DateTime<Local> = entry.modified.into();
        let name = if entry.is_dir {
            format!("{}/", entry.name)
        } else {
            entry.name.clone()
        };
        lines.push(format!(
            "{} {:>8} {} {}",
            marker,
            entry.size,
            mtime.format("%Y-%m-%d %H:%M"),
            name
        ));
    }
    lines.join("\n")
}
