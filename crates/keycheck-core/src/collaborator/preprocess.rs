//! Compiled-source preprocessor collaborator

use std::path::Path;
use std::process::Command;

use super::{Preprocessor, output_lines};
use crate::config::CommandSpec;
use crate::{Error, Result};

/// Runs `program args... <file>`; stdout is the expanded content.
#[derive(Debug, Clone)]
pub struct ProcessPreprocessor {
    spec: CommandSpec,
}

impl ProcessPreprocessor {
    pub fn new(spec: CommandSpec) -> Self {
        Self { spec }
    }
}

impl Preprocessor for ProcessPreprocessor {
    fn describe(&self) -> String {
        self.spec.program.clone()
    }

    fn preprocess(&self, path: &Path) -> Result<Vec<String>> {
        let output = Command::new(&self.spec.program)
            .args(&self.spec.args)
            .arg(path)
            .output()
            .map_err(|source| Error::CollaboratorLaunch {
                role: "preprocessor".to_string(),
                program: self.spec.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(Error::PreprocessFailed {
                program: self.spec.program.clone(),
                path: path.to_path_buf(),
                stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
            });
        }

        Ok(output_lines(&output.stdout))
    }
}
