//! External collaborators
//!
//! The engine never computes canonical values or diffs itself: it delegates to
//! a [`Canonicalizer`] and a [`DiffTool`]. Production runs use external programs
//! ([`ProcessCanonicalizer`], [`ProcessDiffTool`]); the in-process
//! [`TextDiffTool`] honours the same contract.

mod canonicalizer;
mod diff;
mod preprocess;

pub use canonicalizer::{CanonicalDump, ProcessCanonicalizer, ERROR_MARKER};
pub use diff::{DiffOutcome, ProcessDiffTool, TextDiffTool};
pub use preprocess::ProcessPreprocessor;

use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Resolves a key name to its authoritative dump.
pub trait Canonicalizer: Send + Sync {
    /// Short description used in logs.
    fn describe(&self) -> String;

    /// Dump `key`. A dump carrying the `Error` marker is `Ok` with
    /// `failed = true`; `Err` is reserved for the tool not running at all.
    fn canonicalize(&self, key: &str) -> Result<CanonicalDump>;
}

/// Compares two normalized texts.
pub trait DiffTool: Send + Sync {
    fn describe(&self) -> String;

    /// `Err(DiffToolInternalFailure)` when the tool itself breaks.
    fn diff(&self, left: &[String], right: &[String]) -> Result<DiffOutcome>;
}

/// Expands a compiled source into plain lines before extraction.
pub trait Preprocessor: Send + Sync {
    fn describe(&self) -> String;

    fn preprocess(&self, path: &Path) -> Result<Vec<String>>;
}

/// Locate `program` on PATH (or as a direct path) before any work starts.
pub fn ensure_available(role: &str, program: &str) -> Result<PathBuf> {
    which::which(program).map_err(|_| Error::CollaboratorMissing {
        role: role.to_string(),
        program: program.to_string(),
    })
}

/// Split raw output bytes into lines without terminators.
pub(crate) fn output_lines(bytes: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(bytes)
        .lines()
        .map(|l| l.strip_suffix('\r').unwrap_or(l).to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_program_reported() {
        let err = ensure_available("canonicalizer", "keycheck-no-such-tool-xyz").unwrap_err();
        assert!(matches!(err, Error::CollaboratorMissing { .. }));
        assert!(err.to_string().contains("keycheck-no-such-tool-xyz"));
    }

    #[test]
    fn test_output_lines_strips_crlf() {
        assert_eq!(output_lines(b"a\r\nb\n"), vec!["a", "b"]);
    }
}
