use std::path::{Path, PathBuf};

use super::{err, Outcome};
use crate::archive::ArchiveCodec;
use crate::paths::{Expect, Session};

pub fn zip(session: &Session, args: &[String], codec: &dyn ArchiveCodec) -> Outcome {
    pack(session, args, codec, "zip", ".zip")
}

pub fn unzip(session: &Session, args: &[String], codec: &dyn ArchiveCodec) -> Outcome {
    unpack(session, args, codec, "unzip", ".zip")
}

pub fn tar(session: &Session, args: &[String], codec: &dyn ArchiveCodec) -> Outcome {
    pack(session, args, codec, "tar", ".tar.gz")
}

pub fn untar(session: &Session, args: &[String], codec: &dyn ArchiveCodec) -> Outcome {
    unpack(session, args, codec, "untar", ".tar.gz")
}

fn pack(
    session: &Session,
    args: &[String],
    codec: &dyn ArchiveCodec,
    cmd: &str,
    suffix: &str,
) -> Outcome {
    let [folder, name] = args else {
        return Outcome::Failure(err(format!("'{}' requires folder and archive name", cmd)));
    };

    let Some(folder_path) = session.resolve(Some(folder.as_str()), Expect::Dir) else {
        return Outcome::Failure(err(format!("folder '{}' does not exist", folder)));
    };

    let mut archive_name = name.clone();
    if !archive_name.ends_with(suffix) {
        archive_name.push_str(suffix);
    }
    let archive_path = session.resolve_any(Some(archive_name.as_str()));

    match codec.pack(&folder_path, &archive_path) {
        Ok(()) => Outcome::Text(format!("Created archive: {}", archive_path.display())),
        Err(e) => Outcome::Failure(err(format!("{:#}", e))),
    }
}

fn unpack(
    session: &Session,
    args: &[String],
    codec: &dyn ArchiveCodec,
    cmd: &str,
    suffix: &str,
) -> Outcome {
    let [name] = args else {
        return Outcome::Failure(err(format!("'{}' requires an archive name", cmd)));
    };

    let Some(archive_path) = session.resolve(Some(name.as_str()), Expect::File) else {
        return Outcome::Failure(err(format!("archive '{}' does not exist", name)));
    };

    let dest = extract_dir(&archive_path, suffix);
    match codec.unpack(&archive_path, &dest) {
        Ok(()) => Outcome::Text(format!("Extracted to: {}", dest.display())),
        Err(e) => Outcome::Failure(err(format!("{:#}", e))),
    }
}

/// Sibling directory named after the archive with the format suffix
/// stripped: `/a/b/site.tar.gz` extracts into `/a/b/site`.
fn extract_dir(archive: &Path, suffix: &str) -> PathBuf {
    let file_name = archive
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = match file_name.strip_suffix(suffix) {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => file_name,
    };
    archive.with_file_name(stem)
}
