#![cfg(test)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::paths::Session;

/// Temp directory with a known tree, plus sessions rooted in it:
///
/// ```text
/// file1.txt  file2.txt  empty.txt
/// subdir/nested.txt  subdir/deep/deep_file.txt
/// home/                       (injected as the session home)
/// ```
pub struct TestEnv {
    _dir: TempDir,
    root: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        // canonicalized so comparisons against `cd`-canonicalized paths hold
        let root = dir.path().canonicalize().expect("failed to canonicalize");

        fs::write(root.join("file1.txt"), "Hello World!\nLine 2").unwrap();
        fs::write(root.join("file2.txt"), "Another file").unwrap();
        fs::write(root.join("empty.txt"), "").unwrap();
        fs::create_dir(root.join("subdir")).unwrap();
        fs::write(root.join("subdir/nested.txt"), "Nested content").unwrap();
        fs::create_dir(root.join("subdir/deep")).unwrap();
        fs::write(root.join("subdir/deep/deep_file.txt"), "Very deep").unwrap();
        fs::create_dir(root.join("home")).unwrap();

        Self { _dir: dir, root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    pub fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.path(rel)).unwrap()
    }

    /// Session with the temp root as working directory and `home/` as the
    /// home directory, which makes the temp root itself a protected
    /// "parent of home" for safety-guard tests.
    pub fn session(&self) -> Session {
        Session::with_dirs(self.root.clone(), self.root.join("home"))
    }
}
