//! Canonicalizer collaborator

use std::process::Command;
use std::sync::LazyLock;

use regex::Regex;

use super::{Canonicalizer, output_lines};
use crate::config::CommandSpec;
use crate::{Error, Result};

/// Token that marks a canonicalizer failure at the start of an output line.
pub const ERROR_MARKER: &str = "Error";

/// The marker as a whole token. `ErrorLimit=5` or `Error=1` are fields, not failures.
static ERROR_LINE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^\s*{}(?:$|[^\w=])", regex::escape(ERROR_MARKER)))
        .expect("Invalid error line regex")
});

/// Returns true when `line` starts with the failure marker.
pub fn is_error_line(line: &str) -> bool {
    ERROR_LINE_REGEX.is_match(line)
}

/// The canonical dump of one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalDump {
    pub key: String,
    pub lines: Vec<String>,
    /// The tool reported it could not resolve the key.
    pub failed: bool,
    /// The `Error` lines, when `failed`.
    pub error_text: Option<String>,
}

impl CanonicalDump {
    /// Build a dump from the tool's stdout and stderr lines.
    ///
    /// The exit status is deliberately not an input: the tool signals failure
    /// through the marker only.
    pub fn from_output(key: &str, stdout: Vec<String>, stderr: &[String]) -> Self {
        let errors: Vec<&str> = stdout
            .iter()
            .chain(stderr.iter())
            .filter(|l| is_error_line(l))
            .map(|l| l.trim_start())
            .collect();

        let error_text = (!errors.is_empty()).then(|| errors.join("\n"));

        Self {
            key: key.to_string(),
            failed: error_text.is_some(),
            error_text,
            lines: stdout,
        }
    }
}

/// Runs `program args... <key>` and reads the dump from its output.
#[derive(Debug, Clone)]
pub struct ProcessCanonicalizer {
    spec: CommandSpec,
}

impl ProcessCanonicalizer {
    pub fn new(spec: CommandSpec) -> Self {
        Self { spec }
    }
}

impl Canonicalizer for ProcessCanonicalizer {
    fn describe(&self) -> String {
        self.spec.program.clone()
    }

    fn canonicalize(&self, key: &str) -> Result<CanonicalDump> {
        let output = Command::new(&self.spec.program)
            .args(&self.spec.args)
            .arg(key)
            .output()
            .map_err(|source| Error::CollaboratorLaunch {
                role: "canonicalizer".to_string(),
                program: self.spec.program.clone(),
                source,
            })?;

        if !output.status.success() {
            tracing::debug!(
                "Canonicalizer exited with {:?} for key {}",
                output.status.code(),
                key
            );
        }

        let dump = CanonicalDump::from_output(
            key,
            output_lines(&output.stdout),
            &output_lines(&output.stderr),
        );
        if dump.failed {
            tracing::debug!("Canonicalizer could not resolve {}: {:?}", key, dump.error_text);
        }
        Ok(dump)
    }
}
