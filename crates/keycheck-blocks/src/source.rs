//! Configuration sources and their dialects

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// The textual format of a configuration source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    /// `[NAME]` ... `\` blocks written directly.
    KeyBlock,
    /// Preprocessed file holding a single key named after the file.
    Compiled,
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeyBlock => write!(f, "key-block"),
            Self::Compiled => write!(f, "compiled"),
        }
    }
}

/// A configuration source read into memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSource {
    origin: PathBuf,
    dialect: Dialect,
    lines: Vec<String>,
}

impl ConfigSource {
    /// Read a source file from disk.
    pub fn read(path: &Path, dialect: Dialect) -> Result<Self> {
        let lines =
            keycheck_fs::io::read_lines(path).map_err(|source| Error::SourceUnavailable {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::from_lines(path, dialect, lines))
    }

    /// Build a source from lines already in memory (preprocessor output, tests).
    pub fn from_lines(origin: impl Into<PathBuf>, dialect: Dialect, lines: Vec<String>) -> Self {
        Self {
            origin: origin.into(),
            dialect,
            lines,
        }
    }

    pub fn origin(&self) -> &Path {
        &self.origin
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// File name of the origin, lossily converted.
    pub fn file_name(&self) -> String {
        self.origin
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}
