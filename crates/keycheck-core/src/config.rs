//! Run configuration (`keycheck.toml`)
//!
//! ```toml
//! [canonicalizer]
//! program = "keydump"
//! args = ["--plain"]
//!
//! [diff]
//! program = "diff"
//! args = ["-u"]
//!
//! [source]
//! key_block_extensions = ["cfg"]
//! comment_prefixes = ["#"]
//!
//! [naming]
//! extension = "cpl"
//! marker = "TBL"
//!
//! [run]
//! jobs = 4
//! duplicate_keys = "keep"
//! ```
//!
//! Every section and field is optional; missing values take the defaults below.

use std::path::{Path, PathBuf};

use keycheck_blocks::{Dialect, ExtractRules, NamingRules, NormalizeRules};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// File looked up in the working directory when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "keycheck.toml";

/// Selects the in-process diff instead of an external program.
pub const BUILTIN_DIFF: &str = "builtin";

/// An external program and its leading arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// How to treat a key defined twice in the same source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Check every occurrence independently
    #[default]
    Keep,
    /// Abort the run
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Extensions (without dot) of key-block sources.
    pub key_block_extensions: Vec<String>,
    /// Prefixes of comment lines, in sources and dumps alike.
    pub comment_prefixes: Vec<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            key_block_extensions: vec!["cfg".to_string()],
            comment_prefixes: vec!["#".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Keys reconciled concurrently within one file.
    pub jobs: usize,
    pub duplicate_keys: DuplicatePolicy,
    /// File name of the CSV report written in directory mode.
    pub report_name: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            jobs: 1,
            duplicate_keys: DuplicatePolicy::Keep,
            report_name: "keycheck_report.csv".to_string(),
        }
    }
}

/// Complete keycheck configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeycheckConfig {
    pub canonicalizer: CommandSpec,
    pub diff: CommandSpec,
    pub preprocessor: Option<CommandSpec>,
    pub source: SourceConfig,
    pub naming: NamingRules,
    pub run: RunConfig,
}

impl Default for KeycheckConfig {
    fn default() -> Self {
        Self {
            canonicalizer: CommandSpec::new("keydump", &[]),
            diff: CommandSpec::new("diff", &["-u"]),
            preprocessor: None,
            source: SourceConfig::default(),
            naming: NamingRules::default(),
            run: RunConfig::default(),
        }
    }
}

impl KeycheckConfig {
    /// Parse a configuration from TOML text. `origin` is only used in errors.
    pub fn from_toml(content: &str, origin: &Path) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| Error::ConfigParse {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })?;
        config.validate(origin)?;
        Ok(config)
    }

    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = keycheck_fs::io::read_text(path)?;
        Self::from_toml(&content, path)
    }

    /// Resolve the configuration for a run.
    ///
    /// An explicit path must exist. Otherwise `keycheck.toml` in `cwd` is used
    /// when present, and the defaults when not.
    pub fn resolve(explicit: Option<&Path>, cwd: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            tracing::debug!("Loading configuration from {:?}", path);
            return Self::load(path);
        }

        let default_path = cwd.join(CONFIG_FILE_NAME);
        if default_path.is_file() {
            tracing::debug!("Loading configuration from {:?}", default_path);
            Self::load(&default_path)
        } else {
            tracing::debug!("No {} found, using defaults", CONFIG_FILE_NAME);
            Ok(Self::default())
        }
    }

    fn validate(&self, origin: &Path) -> Result<()> {
        let invalid = |message: &str| Error::ConfigParse {
            path: origin.to_path_buf(),
            message: message.to_string(),
        };

        if self.canonicalizer.program.trim().is_empty() {
            return Err(invalid("canonicalizer.program must not be empty"));
        }
        if self.diff.program.trim().is_empty() {
            return Err(invalid("diff.program must not be empty"));
        }
        if self.run.jobs == 0 {
            return Err(invalid("run.jobs must be at least 1"));
        }
        if self.run.report_name.trim().is_empty() {
            return Err(invalid("run.report_name must not be empty"));
        }
        if self.naming.marker.is_empty() {
            return Err(invalid("naming.marker must not be empty"));
        }
        if self
            .source
            .key_block_extensions
            .iter()
            .any(|e| e.eq_ignore_ascii_case(&self.naming.extension))
        {
            return Err(invalid(
                "naming.extension must differ from source.key_block_extensions",
            ));
        }
        Ok(())
    }

    /// Every extension that marks a file as checkable.
    pub fn extensions(&self) -> Vec<String> {
        let mut all = self.source.key_block_extensions.clone();
        all.push(self.naming.extension.clone());
        all
    }

    /// The dialect of `path`, by extension. `None` when the file is not checked.
    pub fn dialect_of(&self, path: &Path) -> Option<Dialect> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case(&self.naming.extension) {
            Some(Dialect::Compiled)
        } else if self
            .source
            .key_block_extensions
            .iter()
            .any(|e| e.eq_ignore_ascii_case(ext))
        {
            Some(Dialect::KeyBlock)
        } else {
            None
        }
    }

    pub fn extract_rules(&self) -> ExtractRules {
        ExtractRules {
            naming: self.naming.clone(),
            comment_prefixes: self.source.comment_prefixes.clone(),
        }
    }

    pub fn normalize_rules(&self) -> NormalizeRules {
        NormalizeRules {
            comment_prefixes: self.source.comment_prefixes.clone(),
        }
    }

    /// Path of the CSV report inside `output_dir`.
    pub fn report_path(&self, output_dir: &Path) -> PathBuf {
        output_dir.join(&self.run.report_name)
    }

    /// Path of the detail file written next to the CSV report.
    pub fn details_path(&self, output_dir: &Path) -> PathBuf {
        self.report_path(output_dir).with_extension("diff")
    }
}
