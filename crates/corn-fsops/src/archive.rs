//! Zip archiving of a workspace's direct children.
//!
//! # Design
//! - Only regular files directly under the workspace are archived; nested
//!   directories and special files are skipped.
//! - Entries are named by base name, sorted, deflated and stamped with the
//!   source file's modification time. The DOS field only has two-second
//!   resolution, so each entry also carries the Unix extended timestamp
//!   (`0x5455`) with the exact second.
//! - Symlinks are followed when they resolve to a regular file; dangling
//!   links are skipped.
//! - The archive lives in a named temporary file that is deleted on drop.

use std::fs::{self, File, Metadata};
use std::io::{self, Read, Seek, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{Datelike, Timelike, Utc};
use tempfile::NamedTempFile;
use tracing::{debug, error};
use walkdir::{DirEntry, WalkDir};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{FsOpsError, FsOpsResult};

/// Comment recorded on every archive produced by the service.
///
/// Stored once as the archive-level comment; the zip writer has no per-entry
/// comment support.
pub const ARCHIVE_COMMENT: &str = "Created by TheCodersCorner";

const READ_BUFFER_SIZE: usize = 2048;
const TEMP_PREFIX: &str = "corn";
const TEMP_SUFFIX: &str = ".zip";

/// Header id of the Info-ZIP extended timestamp extra field.
const EXTENDED_TIMESTAMP_ID: u16 = 0x5455;
const EXTENDED_TIMESTAMP_MTIME: u8 = 0x01;

/// Builds zip archives from workspace directories.
#[derive(Debug, Clone, Default)]
pub struct DirectoryArchiver {
    temp_dir: Option<PathBuf>,
}

impl DirectoryArchiver {
    /// Archiver writing temporary archives to the system temp directory.
    #[must_use]
    pub const fn new() -> Self {
        Self { temp_dir: None }
    }

    /// Archiver writing temporary archives under `dir`.
    #[must_use]
    pub fn with_temp_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            temp_dir: Some(dir.into()),
        }
    }

    /// Archive the regular files directly inside `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be listed, a source file cannot
    /// be read, or the archive cannot be written.
    pub fn archive(&self, dir: &Path) -> FsOpsResult<ArchiveFile> {
        let mut temp = self.create_temp()?;
        let archive_path = temp.path().to_path_buf();

        let entries = write_entries(dir, &archive_path, ZipWriter::new(temp.as_file_mut()))?;
        debug!(
            workspace = %dir.display(),
            archive = %archive_path.display(),
            entries,
            "archive written"
        );
        Ok(ArchiveFile {
            file: temp,
            entries,
        })
    }

    fn create_temp(&self) -> FsOpsResult<NamedTempFile> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(TEMP_PREFIX).suffix(TEMP_SUFFIX);
        match &self.temp_dir {
            Some(dir) => builder
                .tempfile_in(dir)
                .map_err(|source| FsOpsError::io("archive.create_temp", dir, source)),
            None => builder
                .tempfile()
                .map_err(|source| FsOpsError::io("archive.create_temp", std::env::temp_dir(), source)),
        }
    }
}

fn write_entries<W: Write + Seek>(
    dir: &Path,
    archive_path: &Path,
    mut writer: ZipWriter<W>,
) -> FsOpsResult<usize> {
    let mut entries = 0_usize;
    let mut buffer = [0_u8; READ_BUFFER_SIZE];

    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .sort_by_file_name();
    for entry in walker {
        let entry = entry.map_err(|source| {
            error!(workspace = %dir.display(), error = %source, "failed to list workspace");
            FsOpsError::walkdir("archive.read_dir", dir, source)
        })?;
        let path = entry.path();
        let Some(metadata) = regular_file_metadata(&entry)? else {
            debug!(path = %path.display(), "skipping non-file workspace entry");
            continue;
        };

        let name = entry.file_name().to_string_lossy().into_owned();
        let modified = metadata
            .modified()
            .map_err(|source| FsOpsError::io("archive.modified", path, source))?;
        let options = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(zip_timestamp(modified));
        match extended_timestamp(modified) {
            Some(extra) => {
                writer
                    .start_file_with_extra_data(name, options)
                    .map_err(|source| FsOpsError::zip("archive.start_file", path, source))?;
                writer
                    .write_all(&extra)
                    .map_err(|source| FsOpsError::io("archive.write_extra", path, source))?;
                writer
                    .end_extra_data()
                    .map_err(|source| FsOpsError::zip("archive.end_extra", path, source))?;
            }
            None => writer
                .start_file(name, options)
                .map_err(|source| FsOpsError::zip("archive.start_file", path, source))?,
        }
        copy_into(path, &mut writer, &mut buffer)?;
        entries += 1;
    }

    writer.set_comment(ARCHIVE_COMMENT);
    writer
        .finish()
        .map_err(|source| FsOpsError::zip("archive.finish", archive_path, source))?;
    Ok(entries)
}

/// Metadata of the regular file behind `entry`, following a symlink.
///
/// Returns `None` for directories, special files and dangling links.
fn regular_file_metadata(entry: &DirEntry) -> FsOpsResult<Option<Metadata>> {
    let path = entry.path();
    if entry.path_is_symlink() {
        return match fs::metadata(path) {
            Ok(metadata) => Ok(metadata.is_file().then_some(metadata)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(FsOpsError::io("archive.metadata", path, source)),
        };
    }
    if !entry.file_type().is_file() {
        return Ok(None);
    }
    entry
        .metadata()
        .map(Some)
        .map_err(|source| FsOpsError::walkdir("archive.metadata", path, source))
}

fn copy_into(path: &Path, writer: &mut impl Write, buffer: &mut [u8]) -> FsOpsResult<()> {
    let mut source =
        File::open(path).map_err(|source| FsOpsError::io("archive.open_source", path, source))?;
    loop {
        let read = match source.read(buffer) {
            Ok(0) => return Ok(()),
            Ok(read) => read,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(FsOpsError::io("archive.read_source", path, err)),
        };
        writer
            .write_all(&buffer[..read])
            .map_err(|source| FsOpsError::io("archive.write_entry", path, source))?;
    }
}

/// Convert a modification time into a zip timestamp (UTC).
///
/// Times outside the range zip can represent (1980 through 2107) fall back to
/// the zip epoch.
#[must_use]
pub fn zip_timestamp(time: SystemTime) -> zip::DateTime {
    let utc: chrono::DateTime<Utc> = time.into();
    let Ok(year) = u16::try_from(utc.year()) else {
        return zip::DateTime::default();
    };
    zip::DateTime::from_date_and_time(
        year,
        narrow(utc.month()),
        narrow(utc.day()),
        narrow(utc.hour()),
        narrow(utc.minute()),
        narrow(utc.second()),
    )
    .unwrap_or_default()
}

/// Extended timestamp extra field carrying the modification time in whole
/// Unix seconds, or `None` when it does not fit the field's signed 32 bits.
#[must_use]
fn extended_timestamp(time: SystemTime) -> Option<[u8; 9]> {
    let utc: chrono::DateTime<Utc> = time.into();
    let seconds = i32::try_from(utc.timestamp()).ok()?;
    let mut field = [0_u8; 9];
    field[..2].copy_from_slice(&EXTENDED_TIMESTAMP_ID.to_le_bytes());
    field[2..4].copy_from_slice(&5_u16.to_le_bytes());
    field[4] = EXTENDED_TIMESTAMP_MTIME;
    field[5..].copy_from_slice(&seconds.to_le_bytes());
    Some(field)
}

fn narrow(value: u32) -> u8 {
    u8::try_from(value).unwrap_or(u8::MAX)
}

/// A finished archive held in a temporary file.
///
/// The file is removed when this value is dropped.
#[derive(Debug)]
pub struct ArchiveFile {
    file: NamedTempFile,
    entries: usize,
}

impl ArchiveFile {
    /// Location of the temporary archive.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Number of entries written.
    #[must_use]
    pub const fn entries(&self) -> usize {
        self.entries
    }

    /// Read the complete archive into memory.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary file cannot be read.
    pub fn read_bytes(&self) -> FsOpsResult<Vec<u8>> {
        fs::read(self.path()).map_err(|source| FsOpsError::io("archive.read_back", self.path(), source))
    }
}
