use anyhow::{Context, Result};
use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Append-only log of accepted input lines. Mutating commands that fail get
/// a second entry carrying the error text.
pub struct CommandLog {
    path: PathBuf,
}

impl CommandLog {
    /// Creates parent directories and probes the location once, so an
    /// unwritable log path fails at startup instead of mid-session.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create log directory {}", parent.display())
                })?;
            }
        }
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("cannot open log file {}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn record(&self, line: &str) {
        self.append(line);
    }

    pub fn record_failure(&self, line: &str, error: &str) {
        self.append(&format!("{} - ERROR: {}", line, error));
    }

    // Log writes after startup are best-effort; a full disk must not take
    // down the session.
    fn append(&self, message: &str) {
        let stamped = format!(
            "[{}] {}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            message
        );
        let _ = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| file.write_all(stamped.as_bytes()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_appends_stamped_lines() {
        let tmp = tempfile::tempdir().unwrap();
        let log = CommandLog::open(&tmp.path().join("shell.log")).unwrap();

        log.record("ls -l");
        log.record("cd subdir");

        let contents = std::fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with('['));
        assert!(lines[0].ends_with("ls -l"));
        assert!(lines[1].ends_with("cd subdir"));
    }

    #[test]
    fn record_failure_carries_error_text() {
        let tmp = tempfile::tempdir().unwrap();
        let log = CommandLog::open(&tmp.path().join("shell.log")).unwrap();

        log.record_failure("rm ghost.txt", "ERROR: 'ghost.txt' does not exist");

        let contents = std::fs::read_to_string(log.path()).unwrap();
        assert!(contents.contains("rm ghost.txt - ERROR:"));
        assert!(contents.contains("does not exist"));
    }

    #[test]
    fn open_creates_missing_parent_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("logs/deep/shell.log");
        let log = CommandLog::open(&nested).unwrap();
        log.record("ls");
        assert!(nested.exists());
    }

    #[test]
    fn open_fails_on_unwritable_location() {
        let tmp = tempfile::tempdir().unwrap();
        // a directory cannot be opened for appending
        assert!(CommandLog::open(tmp.path()).is_err());
    }
}
