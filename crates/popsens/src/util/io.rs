//! I/O utility functions

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Sibling path used while a file is being written, e.g. `report.json.tmp`
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("output"));
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write bytes to a file atomically using write-then-rename pattern.
///
/// Readers of `path` see either the previous file or the complete new one,
/// never a partially written report.
///
/// # Example
/// ```ignore
/// atomic_write(Path::new("out/report.json"), json.as_bytes())?;
/// ```
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let temp = temp_path(path);
    fs::write(&temp, content)?;
    fs::rename(&temp, path)?;
    Ok(())
}
