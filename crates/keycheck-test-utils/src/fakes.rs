//! In-memory collaborators.

use std::collections::HashMap;
use std::sync::Mutex;

use keycheck_core::{CanonicalDump, Canonicalizer, DiffOutcome, DiffTool, Error, Result};

/// Canonicalizer answering from a fixed table of dumps.
///
/// Keys missing from the table get an `Error: unknown key <key>` dump, like a
/// real canonicalizer asked for a key it does not know.
#[derive(Debug, Default)]
pub struct FakeCanonicalizer {
    dumps: HashMap<String, Vec<String>>,
    calls: Mutex<Vec<String>>,
}

impl FakeCanonicalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the dump of `key`, one output line per text line.
    pub fn with_dump(mut self, key: &str, dump: &str) -> Self {
        self.dumps
            .insert(key.to_string(), dump.lines().map(String::from).collect());
        self
    }

    /// Keys requested so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Canonicalizer for FakeCanonicalizer {
    fn describe(&self) -> String {
        "fake".to_string()
    }

    fn canonicalize(&self, key: &str) -> Result<CanonicalDump> {
        self.calls.lock().unwrap().push(key.to_string());
        let stdout = match self.dumps.get(key) {
            Some(lines) => lines.clone(),
            None => vec![format!("Error: unknown key {key}")],
        };
        Ok(CanonicalDump::from_output(key, stdout, &[]))
    }
}

/// Diff tool that always breaks.
#[derive(Debug, Default)]
pub struct FailingDiffTool;

impl DiffTool for FailingDiffTool {
    fn describe(&self) -> String {
        "failing".to_string()
    }

    fn diff(&self, _left: &[String], _right: &[String]) -> Result<DiffOutcome> {
        Err(Error::DiffToolInternalFailure {
            program: "failing".to_string(),
            stderr: "diff: memory exhausted".to_string(),
        })
    }
}
