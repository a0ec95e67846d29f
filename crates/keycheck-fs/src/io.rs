//! Text I/O helpers with path-aware errors and atomic writes

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use fs2::FileExt;

use crate::{Error, Result};

/// Write content atomically to a file with locking.
///
/// Uses write-to-temp-then-rename so a reader never observes a half-written
/// report. The parent directory is created if missing.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    // Temp file lives next to the target so the rename stays on one filesystem
    let temp_name = format!(
        ".{}.{}.tmp",
        path.file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = path.with_file_name(&temp_name);

    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| Error::io(&temp_path, e))?;

    temp_file
        .lock_exclusive()
        .map_err(|_| Error::LockFailed {
            path: path.to_path_buf(),
        })?;

    temp_file
        .write_all(content)
        .map_err(|e| Error::io(&temp_path, e))?;
    temp_file.sync_all().map_err(|e| Error::io(&temp_path, e))?;

    temp_file.unlock().map_err(|_| Error::LockFailed {
        path: path.to_path_buf(),
    })?;

    fs::rename(&temp_path, path).map_err(|e| Error::io(path, e))?;

    Ok(())
}

/// Read text content from a file.
///
/// Invalid UTF-8 is replaced rather than rejected: source files written by
/// legacy editors are still checkable.
pub fn read_text(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Read a file as a list of lines without line terminators.
///
/// Carriage returns from CRLF files are stripped.
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    let content = read_text(path)?;
    Ok(content
        .lines()
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect())
}

/// Write text content to a file atomically.
pub fn write_text(path: &Path, content: &str) -> Result<()> {
    write_atomic(path, content.as_bytes())
}

/// Copy a file, creating the destination's parent directories.
pub fn copy_file(from: &Path, to: &Path) -> Result<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    fs::copy(from, to).map_err(|e| Error::io(from, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_lines_strips_crlf() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a.cfg");
        fs::write(&path, "[A]\r\nx=1\r\n\\\r\n").unwrap();

        let lines = read_lines(&path).unwrap();
        assert_eq!(lines, vec!["[A]", "x=1", "\\"]);
    }

    #[test]
    fn test_write_atomic_creates_parent() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out/nested/report.csv");

        write_atomic(&path, b"Path;File").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "Path;File");
    }

    #[test]
    fn test_copy_file_into_new_directory() {
        let temp = TempDir::new().unwrap();
        let from = temp.path().join("a.cfg");
        fs::write(&from, "[A]\n\\\n").unwrap();
        let to = temp.path().join("copy/sub/a.cfg");

        copy_file(&from, &to).unwrap();

        assert_eq!(fs::read_to_string(&to).unwrap(), "[A]\n\\\n");
    }
}
