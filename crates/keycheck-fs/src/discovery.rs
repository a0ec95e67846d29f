//! Directory traversal for source discovery

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::{Error, Result};

/// Collect every regular file under `root` whose extension is in `extensions`.
///
/// Extensions are compared case-insensitively and given without the leading
/// dot. Hidden directories (starting with `.`) are skipped. The result is
/// sorted so that runs over the same tree are reproducible.
///
/// A `root` that is itself a file is returned as-is when it matches.
pub fn discover_files(root: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    let files: Vec<PathBuf> = list_files(root)?
        .into_iter()
        .filter(|path| {
            let keep = has_extension(path, extensions);
            if !keep {
                tracing::trace!("Skipping {:?}: extension not checked", path);
            }
            keep
        })
        .collect();

    tracing::debug!("Discovered {} file(s) under {:?}", files.len(), root);
    Ok(files)
}

/// Collect every regular file under `root`, sorted, skipping hidden directories.
pub fn list_files(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.exists() {
        return Err(Error::io(
            root,
            std::io::Error::new(std::io::ErrorKind::NotFound, "path does not exist"),
        ));
    }

    let mut files = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry.file_name()));

    for entry in walker {
        let entry = entry.map_err(|e| Error::Walk {
            path: e.path().unwrap_or(root).to_path_buf(),
            message: e.to_string(),
        })?;

        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }

    files.sort();
    Ok(files)
}

/// Returns true when the path's extension is one of `extensions`.
pub fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_str().is_some_and(|s| s.starts_with('.'))
}
