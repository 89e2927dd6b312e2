use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Interpreter state that outlives a single command: the working directory
/// (read by every relative resolution, written only by `cd`) and the home
/// directory (read by `~` expansion and the safety guard). Owning these
/// explicitly keeps resolution unit-testable with injected directories.
pub struct Session {
    cwd: PathBuf,
    home: PathBuf,
}

/// Constraint a resolved path must satisfy. `Dir` and `File` imply existence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expect {
    Exists,
    Dir,
    File,
}

impl Session {
    pub fn from_env() -> Result<Self> {
        let cwd = std::env::current_dir().context("cannot determine working directory")?;
        let home = directories::BaseDirs::new()
            .map(|dirs| dirs.home_dir().to_path_buf())
            .context("cannot determine home directory")?;
        Ok(Self { cwd, home })
    }

    pub fn with_dirs(cwd: PathBuf, home: PathBuf) -> Self {
        Self { cwd, home }
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn set_cwd(&mut self, dir: PathBuf) {
        self.cwd = dir;
    }

    /// Turn a user-typed token into an absolute path without touching the
    /// filesystem. No token means the working directory; `~` and `~/rest`
    /// expand against the session home; relative tokens join onto the
    /// working directory as it is right now.
    pub fn resolve_any(&self, token: Option<&str>) -> PathBuf {
        let token = match token {
            None | Some("") => return self.cwd.clone(),
            Some(t) => t,
        };

        let path = if token == "~" {
            self.home.clone()
        } else if let Some(rest) = token.strip_prefix("~/") {
            self.home.join(rest)
        } else {
            PathBuf::from(token)
        };

        if path.is_absolute() {
            path
        } else {
            self.cwd.join(path)
        }
    }

    /// Resolve a token and check it against the live filesystem. Returns
    /// `None` when the constraint is violated; never errors and never
    /// performs side effects.
    pub fn resolve(&self, token: Option<&str>, expect: Expect) -> Option<PathBuf> {
        let path = self.resolve_any(token);
        let ok = match expect {
            Expect::Exists => path.exists(),
            Expect::Dir => path.is_dir(),
            Expect::File => path.is_file(),
        };
        ok.then_some(path)
    }
}

/// Reject destructive operations on protected system locations: the
/// filesystem root and the parent of the home directory. The path is
/// canonicalized first so symlinks and `..` cannot sneak past the check.
pub fn is_safe_path(session: &Session, path: &Path) -> bool {
    let canonical = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    if canonical.parent().is_none() {
        return false;
    }
    match session.home.parent() {
        Some(home_parent) => canonical.as_path() != home_parent,
        None => true,
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(rest);
        }
    } else if path == "~" {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home);
        }
    }
    PathBuf::from(path)
}
