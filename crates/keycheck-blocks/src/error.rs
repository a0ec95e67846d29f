//! Error types for keycheck-blocks

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Source unavailable: {path}: {source}")]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: keycheck_fs::Error,
    },

    #[error("Invalid naming pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },
}
