//! Report data types

use std::fmt;

use serde::{Deserialize, Serialize};

/// Outcome of one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum KeyStatus {
    /// Source and canonical dump agree after normalization
    #[serde(rename = "KEY_UNCHANGED")]
    Unchanged,
    /// Source and canonical dump differ
    #[serde(rename = "KEY_UPDATED")]
    Updated,
    /// The canonicalizer could not resolve a non-empty key
    #[serde(rename = "KEY_ERROR")]
    Error,
}

impl KeyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unchanged => "KEY_UNCHANGED",
            Self::Updated => "KEY_UPDATED",
            Self::Error => "KEY_ERROR",
        }
    }
}

impl fmt::Display for KeyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregate status of a key across the run, or of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileStatus {
    #[serde(rename = "FILE_UNCHANGED")]
    Unchanged,
    #[serde(rename = "FILE_UPDATED")]
    Updated,
}

impl FileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unchanged => "FILE_UNCHANGED",
            Self::Updated => "FILE_UPDATED",
        }
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reconciled key. Written once, never modified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonRecord {
    /// Directory holding the source file
    pub path: String,
    /// Source file name
    pub file: String,
    pub key: String,
    pub status: KeyStatus,
    /// Diff listing or canonicalizer error. Not part of the CSV.
    #[serde(skip)]
    pub detail: Option<String>,
}

/// A finalized report row, in CSV column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    #[serde(rename = "Path")]
    pub path: String,
    #[serde(rename = "File")]
    pub file: String,
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "Key_chg")]
    pub status: KeyStatus,
    /// Rows sharing this key, across all files
    #[serde(rename = "File_key_nb")]
    pub key_occurrence_count: usize,
    #[serde(rename = "File_chg")]
    pub file_aggregate_status: FileStatus,
    /// Rows sharing this exact status
    #[serde(rename = "Key_dbl")]
    pub status_occurrence_count: usize,
    /// Distinct file names holding this key, sorted, comma-joined
    #[serde(rename = "File_dbl")]
    pub sibling_files_for_key: String,
}

/// Per-file counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSummary {
    pub path: String,
    pub file: String,
    pub unchanged: usize,
    pub updated: usize,
    pub errors: usize,
}

impl FileSummary {
    pub fn keys(&self) -> usize {
        self.unchanged + self.updated + self.errors
    }

    /// `FILE_UNCHANGED` iff every key of the file is unchanged.
    pub fn status(&self) -> FileStatus {
        if self.unchanged == self.keys() {
            FileStatus::Unchanged
        } else {
            FileStatus::Updated
        }
    }
}
