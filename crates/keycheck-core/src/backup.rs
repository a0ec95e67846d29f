//! Input tree backup
//!
//! Before a run with `--backup`, every file of the input is copied to
//! `<output>/.keycheck-backup/<YYYYmmdd-HHMMSS>/` together with a
//! `metadata.toml` describing the copy.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Directory under the output directory holding all backups.
pub const BACKUP_DIR_NAME: &str = ".keycheck-backup";

const METADATA_FILE: &str = "metadata.toml";

/// Metadata stored next to a backup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupMetadata {
    /// The file or directory that was copied
    pub source: PathBuf,
    /// When the backup was created
    pub created: DateTime<Utc>,
    /// Copied files, relative to `source` (for a single file, its name)
    pub files: Vec<String>,
}

/// A backup on disk
#[derive(Debug, Clone)]
pub struct SourceBackup {
    pub path: PathBuf,
    pub metadata: BackupMetadata,
}

/// Creates backups under an output directory
#[derive(Debug, Clone)]
pub struct BackupManager {
    backups_dir: PathBuf,
}

impl BackupManager {
    pub fn new(output_dir: &Path) -> Self {
        Self {
            backups_dir: output_dir.join(BACKUP_DIR_NAME),
        }
    }

    /// Copy `source` (a file or a directory tree) into a fresh backup.
    pub fn create(&self, source: &Path) -> Result<SourceBackup> {
        let created = Utc::now();
        let target = self.fresh_dir(&created);

        let files = if source.is_file() {
            let name = source
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            keycheck_fs::io::copy_file(source, &target.join(&name))?;
            vec![name]
        } else if source.is_dir() {
            let mut files = Vec::new();
            for file in keycheck_fs::list_files(source)? {
                let Ok(relative) = file.strip_prefix(source) else {
                    continue;
                };
                keycheck_fs::io::copy_file(&file, &target.join(relative))?;
                files.push(relative.to_string_lossy().replace('\\', "/"));
            }
            files
        } else {
            return Err(Error::SourceUnavailable {
                path: source.to_path_buf(),
                reason: "nothing to back up".to_string(),
            });
        };

        let metadata = BackupMetadata {
            source: source.to_path_buf(),
            created,
            files,
        };
        let content = toml::to_string_pretty(&metadata)?;
        keycheck_fs::io::write_text(&target.join(METADATA_FILE), &content)?;

        tracing::info!(
            "Backed up {} file(s) from {:?} to {:?}",
            metadata.files.len(),
            source,
            target
        );
        Ok(SourceBackup {
            path: target,
            metadata,
        })
    }

    /// First unused `<timestamp>[-n]` directory name.
    fn fresh_dir(&self, created: &DateTime<Utc>) -> PathBuf {
        let stamp = created.format("%Y%m%d-%H%M%S").to_string();
        let mut candidate = self.backups_dir.join(&stamp);
        let mut n = 1;
        while candidate.exists() {
            candidate = self.backups_dir.join(format!("{stamp}-{n}"));
            n += 1;
        }
        candidate
    }
}
