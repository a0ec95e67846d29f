//! Error types for keycheck-core

use std::path::PathBuf;

/// Result type for keycheck-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in keycheck-core operations
///
/// Per-key canonicalization failures are not errors: they are recorded as
/// `KEY_ERROR` rows. Everything here aborts the current run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Input path missing or unreadable
    #[error("Source unavailable: {path}: {reason}")]
    SourceUnavailable { path: PathBuf, reason: String },

    /// A file whose extension matches no configured dialect
    #[error("Not a checked source: {path} (extension matches no dialect)")]
    UnsupportedSource { path: PathBuf },

    /// A required external tool cannot be found
    #[error("{role} not found: '{program}' is not installed or not on PATH")]
    CollaboratorMissing { role: String, program: String },

    /// An external tool exists but could not be started
    #[error("Failed to run {role} '{program}': {source}")]
    CollaboratorLaunch {
        role: String,
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The diff tool reported a failure of its own
    #[error("Diff tool '{program}' failed: {stderr}")]
    DiffToolInternalFailure { program: String, stderr: String },

    /// The preprocessor could not expand a compiled source
    #[error("Preprocessor '{program}' failed on {path}: {stderr}")]
    PreprocessFailed {
        program: String,
        path: PathBuf,
        stderr: String,
    },

    /// A key appears twice in one source while duplicates are rejected
    #[error("Duplicate key '{key}' in {path}")]
    DuplicateKey { key: String, path: PathBuf },

    /// Configuration file could not be parsed or is invalid
    #[error("Invalid configuration {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from keycheck-fs
    #[error(transparent)]
    Fs(#[from] keycheck_fs::Error),

    /// Extraction error from keycheck-blocks
    #[error(transparent)]
    Blocks(#[from] keycheck_blocks::Error),

    /// Report serialization error
    #[error(transparent)]
    Csv(#[from] csv::Error),

    /// TOML serialization error
    #[error(transparent)]
    TomlSer(#[from] toml::ser::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
