//! Filesystem fixtures.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tempfile::TempDir;

/// Create a fresh temporary directory with the given prefix.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn temp_dir(prefix: &str) -> io::Result<TempDir> {
    tempfile::Builder::new().prefix(prefix).tempdir()
}

/// A fixed point in time, `secs` after the Unix epoch.
#[must_use]
pub fn fixed_time(secs: u64) -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(secs)
}

/// Write `contents` to `path`, creating parents, and pin its modification time.
///
/// # Errors
///
/// Returns an error if the file cannot be written or its mtime cannot be set.
pub fn write_file(path: &Path, contents: &[u8], modified: SystemTime) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(contents)?;
    file.flush()?;
    file.set_modified(modified)?;
    Ok(())
}
