//! Diff tool collaborator

use std::io::Write;
use std::process::Command;

use similar::TextDiff;
use tempfile::NamedTempFile;

use super::DiffTool;
use crate::config::CommandSpec;
use crate::{Error, Result};

/// Result of comparing two normalized texts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffOutcome {
    Identical,
    /// The tool's difference listing.
    Differs(String),
}

fn joined(lines: &[String]) -> String {
    let mut text = lines.join("\n");
    if !text.is_empty() {
        text.push('\n');
    }
    text
}

/// Runs `program args... <left> <right>` over two temporary files.
///
/// Empty stdout means equivalent, anything on stdout is a difference listing,
/// anything on stderr is a failure of the tool. The exit status is ignored:
/// `diff` exits 1 on plain differences.
#[derive(Debug, Clone)]
pub struct ProcessDiffTool {
    spec: CommandSpec,
}

impl ProcessDiffTool {
    pub fn new(spec: CommandSpec) -> Self {
        Self { spec }
    }

    fn temp_with(&self, lines: &[String]) -> Result<NamedTempFile> {
        let mut file = tempfile::Builder::new()
            .prefix("keycheck-")
            .suffix(".txt")
            .tempfile()?;
        file.write_all(joined(lines).as_bytes())?;
        file.flush()?;
        Ok(file)
    }
}

impl DiffTool for ProcessDiffTool {
    fn describe(&self) -> String {
        self.spec.program.clone()
    }

    fn diff(&self, left: &[String], right: &[String]) -> Result<DiffOutcome> {
        // Per-call files: concurrent keys never share a path
        let left_file = self.temp_with(left)?;
        let right_file = self.temp_with(right)?;

        let output = Command::new(&self.spec.program)
            .args(&self.spec.args)
            .arg(left_file.path())
            .arg(right_file.path())
            .output()
            .map_err(|source| Error::CollaboratorLaunch {
                role: "diff tool".to_string(),
                program: self.spec.program.clone(),
                source,
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            return Err(Error::DiffToolInternalFailure {
                program: self.spec.program.clone(),
                stderr: stderr.trim_end().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        if stdout.trim().is_empty() {
            Ok(DiffOutcome::Identical)
        } else {
            Ok(DiffOutcome::Differs(stdout.into_owned()))
        }
    }
}

/// In-process unified diff, selected with `program = "builtin"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextDiffTool;

impl DiffTool for TextDiffTool {
    fn describe(&self) -> String {
        crate::config::BUILTIN_DIFF.to_string()
    }

    fn diff(&self, left: &[String], right: &[String]) -> Result<DiffOutcome> {
        if left == right {
            return Ok(DiffOutcome::Identical);
        }

        let old = joined(left);
        let new = joined(right);
        let text_diff = TextDiff::from_lines(old.as_str(), new.as_str());
        let listing = text_diff
            .unified_diff()
            .context_radius(3)
            .header("source", "canonical")
            .to_string();

        Ok(DiffOutcome::Differs(listing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_builtin_identical() {
        let a = v(&["[A]", "x=1", "\\"]);
        assert_eq!(TextDiffTool.diff(&a, &a).unwrap(), DiffOutcome::Identical);
    }

    #[test]
    fn test_builtin_lists_changed_line() {
        let outcome = TextDiffTool
            .diff(&v(&["[A]", "x=1", "\\"]), &v(&["[A]", "x=2", "\\"]))
            .unwrap();
        let DiffOutcome::Differs(listing) = outcome else {
            panic!("expected differences");
        };
        assert!(listing.contains("--- source"));
        assert!(listing.contains("-x=1"));
        assert!(listing.contains("+x=2"));
    }

    #[test]
    fn test_joined_ends_with_newline() {
        assert_eq!(joined(&v(&["a", "b"])), "a\nb\n");
        assert_eq!(joined(&[]), "");
    }

    #[test]
    fn test_describe_names_the_program() {
        assert_eq!(TextDiffTool.describe(), "builtin");
        let tool = ProcessDiffTool::new(CommandSpec::new("diff", &["-u"]));
        assert_eq!(tool.describe(), "diff");
    }
}
