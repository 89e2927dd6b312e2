use anyhow::{bail, Context, Result};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io;
use std::path::Path;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Pack/unpack service behind which the archive formats live. Commands only
/// see this trait; entry layout is the codec's business.
///
/// `pack` stores the folder's contents prefixed with the folder's own name,
/// so unpacking into a directory recreates `<name>/...`.
pub trait ArchiveCodec {
    fn pack(&self, folder: &Path, archive: &Path) -> Result<()>;
    fn unpack(&self, archive: &Path, dest: &Path) -> Result<()>;
}

pub struct ZipCodec;

impl ArchiveCodec for ZipCodec {
    fn pack(&self, folder: &Path, archive: &Path) -> Result<()> {
        let base = folder.parent().unwrap_or(folder);
        let file = File::create(archive)
            .with_context(|| format!("failed to create {}", archive.display()))?;
        let mut writer = ZipWriter::new(file);
        let options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for entry in WalkDir::new(folder) {
            let entry = entry.context("failed to walk folder")?;
            let rel = entry.path().strip_prefix(base)?;
            if rel.as_os_str().is_empty() {
                continue;
            }
            let name = rel.to_string_lossy().into_owned();
            if entry.file_type().is_dir() {
                writer
                    .add_directory(name, options)
                    .context("failed to add directory entry")?;
            } else {
                writer
                    .start_file(name, options)
                    .context("failed to start archive entry")?;
                let mut input = File::open(entry.path())
                    .with_context(|| format!("failed to read {}", entry.path().display()))?;
                io::copy(&mut input, &mut writer).context("failed to write archive entry")?;
            }
        }

        writer.finish().context("failed to finish zip archive")?;
        Ok(())
    }

    fn unpack(&self, archive: &Path, dest: &Path) -> Result<()> {
        let file = File::open(archive)
            .with_context(|| format!("failed to open {}", archive.display()))?;
        let mut zip = ZipArchive::new(file)
            .with_context(|| format!("{} is not a valid zip archive", archive.display()))?;
        zip.extract(dest)
            .with_context(|| format!("failed to extract into {}", dest.display()))?;
        Ok(())
    }
}

pub struct TarGzCodec;

impl ArchiveCodec for TarGzCodec {
    fn pack(&self, folder: &Path, archive: &Path) -> Result<()> {
        let Some(name) = folder.file_name() else {
            bail!("cannot archive {}", folder.display());
        };
        let file = File::create(archive)
            .with_context(|| format!("failed to create {}", archive.display()))?;
        let encoder = GzEncoder::new(file, Compression::default());
        let mut builder = tar::Builder::new(encoder);
        builder
            .append_dir_all(name, folder)
            .with_context(|| format!("failed to archive {}", folder.display()))?;
        let encoder = builder
            .into_inner()
            .context("failed to finish tar stream")?;
        encoder.finish().context("failed to finish gzip stream")?;
        Ok(())
    }

    fn unpack(&self, archive: &Path, dest: &Path) -> Result<()> {
        let file = File::open(archive)
            .with_context(|| format!("failed to open {}", archive.display()))?;
        let mut reader = tar::Archive::new(GzDecoder::new(file));
        reader
            .unpack(dest)
            .with_context(|| format!("failed to extract into {}", dest.display()))?;
        Ok(())
    }
}
