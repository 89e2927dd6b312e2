use anyhow::{bail, Context, Result};
use std::path::Path;

use super::{aggregate, err, Outcome};
use crate::paths::{is_safe_path, Expect, Session};

/// Move is always recursive; there is no flag to parse. The final argument
/// is the destination, everything before it a source.
pub fn mv(session: &Session, args: &[String]) -> Outcome {
    if args.len() < 2 {
        return Outcome::Failure(err("'mv' requires source and destination"));
    }
    let (sources, destination) = args.split_at(args.len() - 1);
    let destination = &destination[0];

    if sources.len() > 1
        && session
            .resolve(Some(destination.as_str()), Expect::Dir)
            .is_none()
    {
        return Outcome::Failure(err(
            "multiple sources require an existing directory destination",
        ));
    }

    let mut failures = Vec::new();
    for source in sources {
        if let Err(line) = move_item(session, source, destination) {
            failures.push(line);
        }
    }
    aggregate(failures)
}

fn move_item(session: &Session, source: &str, destination: &str) -> Result<(), String> {
    let Some(source_path) = session.resolve(Some(source), Expect::Exists) else {
        return Err(err(format!("source '{}' does not exist", source)));
    };

    if !is_safe_path(session, &source_path) {
        return Err(err(format!("cannot move system directory '{}'", source)));
    }

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

    if source_path.is_dir() && target.starts_with(&source_path) {
        return Err(err("cannot move a directory into itself"));
    }

    match target.parent() {
        Some(parent) if parent.is_dir() => {}
        _ => {
            return Err(err(format!(
                "destination directory '{}' does not exist",
                target.parent().unwrap_or(Path::new("")).display()
            )))
        }
    }

    relocate(&source_path, &target).map_err(|e| err(format!("{:#}", e)))
}

fn relocate(source: &Path, target: &Path) -> Result<()> {
    if !target.exists() {
        return std::fs::rename(source, target).with_context(|| {
            format!(
                "failed to move '{}' to '{}'",
                source.display(),
                target.display()
            )
        });
    }

    let source_is_dir = source.is_dir();
    let target_is_dir = target.is_dir();

    if !source_is_dir && !target_is_dir {
        std::fs::remove_file(target)
            .with_context(|| format!("failed to replace '{}'", target.display()))?;
        std::fs::rename(source, target).with_context(|| {
            format!(
                "failed to move '{}' to '{}'",
                source.display(),
                target.display()
            )
        })
    } else if source_is_dir && target_is_dir {
        merge_directories(source, target)
    } else {
        let name = target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| target.display().to_string());
        bail!("cannot overwrite '{}' with a different type", name);
    }
}

/// Reconciles a source directory into an existing destination directory:
/// same-named files are overwritten by relocation, same-named
/// subdirectories merged recursively (created first if absent). The source
/// directory is removed only after every entry has been relocated.
fn merge_directories(source: &Path, target: &Path) -> Result<()> {
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
            if !to.exists() {
                std::fs::create_dir(&to)
                    .with_context(|| format!("failed to create '{}'", to.display()))?;
            }
            merge_directories(&from, &to)?;
        } else {
            if to.is_file() {
                std::fs::remove_file(&to)
                    .with_context(|| format!("failed to replace '{}'", to.display()))?;
            }
            std::fs::rename(&from, &to).with_context(|| {
                format!("failed to move '{}' to '{}'", from.display(), to.display())
            })?;
        }
    }

    std::fs::remove_dir(source)
        .with_context(|| format!("failed to remove emptied '{}'", source.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::TestEnv;

    fn run(env: &TestEnv, args: &[&str]) -> Outcome {
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        mv(&env.session(), &args)
    }

    #[test]
    fn renames_a_file() {
        let env = TestEnv::new();
        assert_eq!(run(&env, &["file1.txt", "renamed.txt"]), Outcome::Quiet);
        assert!(!env.path("file1.txt").exists());
        assert_eq!(env.read("renamed.txt"), "Hello World!\nLine 2");
    }

    #[test]
    fn moves_file_into_directory() {
        let env = TestEnv::new();
        assert_eq!(run(&env, &["file1.txt", "subdir"]), Outcome::Quiet);
        assert!(!env.path("file1.txt").exists());
        assert_eq!(env.read("subdir/file1.txt"), "Hello World!\nLine 2");
    }

    #[test]
    fn overwrites_existing_file() {
        let env = TestEnv::new();
        assert_eq!(run(&env, &["file1.txt", "file2.txt"]), Outcome::Quiet);
        assert!(!env.path("file1.txt").exists());
        assert_eq!(env.read("file2.txt"), "Hello World!\nLine 2");
    }

    #[test]
    fn merges_directory_into_same_named_destination() {
        let env = TestEnv::new();
        // src/f.txt and dst/src/g.txt; `mv src dst` must merge, not replace
        std::fs::create_dir(env.path("src")).unwrap();
        std::fs::write(env.path("src/f.txt"), "from source").unwrap();
        std::fs::create_dir_all(env.path("dst/src")).unwrap();
        std::fs::write(env.path("dst/src/g.txt"), "already there").unwrap();

        assert_eq!(run(&env, &["src", "dst"]), Outcome::Quiet);
        assert_eq!(env.read("dst/src/f.txt"), "from source");
        assert_eq!(env.read("dst/src/g.txt"), "already there");
        assert!(!env.path("src").exists());
    }

    #[test]
    fn merge_overwrites_same_named_files() {
        let env = TestEnv::new();
        std::fs::create_dir(env.path("src")).unwrap();
        std::fs::write(env.path("src/f.txt"), "new").unwrap();
        std::fs::create_dir_all(env.path("dst/src")).unwrap();
        std::fs::write(env.path("dst/src/f.txt"), "old").unwrap();

        assert_eq!(run(&env, &["src", "dst"]), Outcome::Quiet);
        assert_eq!(env.read("dst/src/f.txt"), "new");
        assert!(!env.path("src").exists());
    }

    #[test]
    fn merge_recurses_into_nested_directories() {
        let env = TestEnv::new();
        std::fs::create_dir_all(env.path("src/sub")).unwrap();
        std::fs::write(env.path("src/sub/a.txt"), "a").unwrap();
        std::fs::create_dir_all(env.path("dst/src/sub")).unwrap();
        std::fs::write(env.path("dst/src/sub/b.txt"), "b").unwrap();

        assert_eq!(run(&env, &["src", "dst"]), Outcome::Quiet);
        assert_eq!(env.read("dst/src/sub/a.txt"), "a");
        assert_eq!(env.read("dst/src/sub/b.txt"), "b");
        assert!(!env.path("src").exists());
    }

    #[test]
    fn type_mismatch_is_error_and_nothing_changes() {
        let env = TestEnv::new();
        // moving a file onto a same-named directory
        std::fs::create_dir(env.path("dest")).unwrap();
        std::fs::create_dir(env.path("dest/file1.txt")).unwrap();
        let outcome = run(&env, &["file1.txt", "dest"]);
        assert!(matches!(outcome, Outcome::Failure(ref r) if r.contains("different type")));
        assert!(env.path("file1.txt").exists());
        assert!(env.path("dest/file1.txt").is_dir());
    }

    #[test]
    fn directory_into_own_subtree_is_error() {
        let env = TestEnv::new();
        let outcome = run(&env, &["subdir", "subdir/deep"]);
        assert!(matches!(outcome, Outcome::Failure(ref r) if r.contains("into itself")));
        assert!(env.path("subdir/nested.txt").exists());
    }

    #[test]
    fn same_source_and_destination_is_error() {
        let env = TestEnv::new();
        let outcome = run(&env, &["file1.txt", "file1.txt"]);
        assert!(matches!(outcome, Outcome::Failure(ref r) if r.contains("the same")));
        assert!(env.path("file1.txt").exists());
    }

    #[test]
    fn missing_destination_parent_is_error() {
        let env = TestEnv::new();
        let outcome = run(&env, &["file1.txt", "no/such/place.txt"]);
        assert!(matches!(outcome, Outcome::Failure(ref r) if r.contains("does not exist")));
        assert!(env.path("file1.txt").exists());
    }

    #[test]
    fn missing_source_is_error() {
        let env = TestEnv::new();
        let outcome = run(&env, &["ghost.txt", "anywhere.txt"]);
        assert!(matches!(outcome, Outcome::Failure(ref r) if r.contains("does not exist")));
    }

    #[test]
    fn system_directory_is_never_movable() {
        let env = TestEnv::new();
        let outcome = run(&env, &["/", "elsewhere"]);
        assert!(matches!(outcome, Outcome::Failure(ref r) if r.contains("system directory")));
    }

    #[test]
    fn moves_multiple_files_into_directory() {
        let env = TestEnv::new();
        std::fs::create_dir(env.path("destination")).unwrap();
        assert_eq!(
            run(&env, &["file1.txt", "file2.txt", "destination"]),
            Outcome::Quiet
        );
        assert!(env.path("destination/file1.txt").exists());
        assert!(env.path("destination/file2.txt").exists());
        assert!(!env.path("file1.txt").exists());
        assert!(!env.path("file2.txt").exists());
    }

    #[test]
    fn multi_source_requires_existing_directory_destination() {
        let env = TestEnv::new();
        let outcome = run(&env, &["file1.txt", "file2.txt", "missing"]);
        assert!(
            matches!(outcome, Outcome::Failure(ref r) if r.contains("existing directory destination"))
        );
        assert!(env.path("file1.txt").exists());
        assert!(env.path("file2.txt").exists());
    }

    #[test]
    fn best_effort_continues_past_a_failed_source() {
        let env = TestEnv::new();
        std::fs::create_dir(env.path("dest")).unwrap();
        let outcome = run(&env, &["ghost.txt", "file1.txt", "dest"]);
        match outcome {
            Outcome::Failure(report) => {
                assert!(report.contains("ghost.txt"));
                assert_eq!(report.lines().count(), 1);
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert!(env.path("dest/file1.txt").exists());
    }
}
