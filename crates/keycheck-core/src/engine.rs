//! Run orchestration
//!
//! [`CheckEngine`] owns the collaborators and drives every file of a run:
//! read, extract, reconcile each key, record. Keys of one file can be
//! reconciled on a bounded pool of scoped threads; records always keep
//! extraction order.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;

use keycheck_blocks::{ConfigSource, Dialect, ExtractRules, KeyBlock, NormalizeRules, extract_blocks};

use crate::collaborator::{
    Canonicalizer, DiffTool, Preprocessor, ProcessCanonicalizer, ProcessDiffTool,
    ProcessPreprocessor, TextDiffTool, ensure_available,
};
use crate::config::{BUILTIN_DIFF, DuplicatePolicy, KeycheckConfig};
use crate::reconcile::{KeyOutcome, KeyReconciler};
use crate::report::{ComparisonRecord, FileStatus, KeyStatus, Report};
use crate::{Error, Result};

/// Result of checking one source file.
#[derive(Debug, Clone)]
pub struct FileCheck {
    pub path: PathBuf,
    pub dialect: Dialect,
    pub report: Report,
}

impl FileCheck {
    pub fn keys(&self) -> usize {
        self.report.len()
    }

    /// `FILE_UNCHANGED` iff every key is unchanged. A file without keys is unchanged.
    pub fn status(&self) -> FileStatus {
        if self.report.count_status(KeyStatus::Unchanged) == self.report.len() {
            FileStatus::Unchanged
        } else {
            FileStatus::Updated
        }
    }
}

/// A source visited during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckedSource {
    pub path: PathBuf,
    pub dialect: Dialect,
    pub keys: usize,
}

/// Result of checking a file or a directory tree.
#[derive(Debug, Clone)]
pub struct CheckRun {
    pub sources: Vec<CheckedSource>,
    pub report: Report,
}

/// Drives reconciliation over sources.
pub struct CheckEngine {
    config: KeycheckConfig,
    canonicalizer: Box<dyn Canonicalizer>,
    diff: Box<dyn DiffTool>,
    preprocessor: Option<Box<dyn Preprocessor>>,
    extract_rules: ExtractRules,
    normalize_rules: NormalizeRules,
}

impl CheckEngine {
    /// Build an engine with the external programs named in `config`.
    ///
    /// Every program is located before any file is read; a missing one is a
    /// [`Error::CollaboratorMissing`].
    pub fn from_config(config: KeycheckConfig) -> Result<Self> {
        ensure_available("canonicalizer", &config.canonicalizer.program)?;
        let canonicalizer = Box::new(ProcessCanonicalizer::new(config.canonicalizer.clone()));

        let diff: Box<dyn DiffTool> = if config.diff.program == BUILTIN_DIFF {
            Box::new(TextDiffTool)
        } else {
            ensure_available("diff tool", &config.diff.program)?;
            Box::new(ProcessDiffTool::new(config.diff.clone()))
        };

        let preprocessor = match &config.preprocessor {
            Some(spec) => {
                ensure_available("preprocessor", &spec.program)?;
                Some(Box::new(ProcessPreprocessor::new(spec.clone())) as Box<dyn Preprocessor>)
            }
            None => None,
        };

        let mut engine = Self::with_collaborators(config, canonicalizer, diff);
        engine.preprocessor = preprocessor;
        Ok(engine)
    }

    /// Build an engine around caller-supplied collaborators.
    pub fn with_collaborators(
        config: KeycheckConfig,
        canonicalizer: Box<dyn Canonicalizer>,
        diff: Box<dyn DiffTool>,
    ) -> Self {
        tracing::debug!(
            "Using canonicalizer {} and diff tool {}",
            canonicalizer.describe(),
            diff.describe()
        );
        Self {
            extract_rules: config.extract_rules(),
            normalize_rules: config.normalize_rules(),
            config,
            canonicalizer,
            diff,
            preprocessor: None,
        }
    }

    pub fn with_preprocessor(mut self, preprocessor: Box<dyn Preprocessor>) -> Self {
        self.preprocessor = Some(preprocessor);
        self
    }

    pub fn config(&self) -> &KeycheckConfig {
        &self.config
    }

    /// Check a single file or every source below a directory.
    pub fn check_path(&self, path: &Path) -> Result<CheckRun> {
        if path.is_file() {
            let check = self.check_file(path)?;
            return Ok(CheckRun {
                sources: vec![CheckedSource {
                    path: check.path.clone(),
                    dialect: check.dialect,
                    keys: check.keys(),
                }],
                report: check.report,
            });
        }
        if !path.is_dir() {
            return Err(Error::SourceUnavailable {
                path: path.to_path_buf(),
                reason: "no such file or directory".to_string(),
            });
        }
        self.check_dir(path)
    }

    /// Check every source below `root`, in sorted path order.
    pub fn check_dir(&self, root: &Path) -> Result<CheckRun> {
        let files = keycheck_fs::discover_files(root, &self.config.extensions())?;
        tracing::info!("Found {} source file(s) under {:?}", files.len(), root);

        let mut run = CheckRun {
            sources: Vec::with_capacity(files.len()),
            report: Report::new(),
        };
        for file in files {
            let check = self.check_file(&file)?;
            run.sources.push(CheckedSource {
                path: check.path,
                dialect: check.dialect,
                keys: check.report.len(),
            });
            run.report.merge(check.report);
        }
        Ok(run)
    }

    /// Check one source file.
    pub fn check_file(&self, path: &Path) -> Result<FileCheck> {
        let dialect = self
            .config
            .dialect_of(path)
            .ok_or_else(|| Error::UnsupportedSource {
                path: path.to_path_buf(),
            })?;

        let source = self.read_source(path, dialect)?;
        let blocks = extract_blocks(&source, &self.extract_rules)?;
        self.check_duplicates(path, &blocks)?;

        let outcomes = self.reconcile_all(&blocks)?;

        let dir = path
            .parent()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        let file = source.file_name();

        let mut report = Report::new();
        for (block, outcome) in blocks.into_iter().zip(outcomes) {
            report.push(ComparisonRecord {
                path: dir.clone(),
                file: file.clone(),
                key: block.key,
                status: outcome.status,
                detail: outcome.detail,
            });
        }

        tracing::info!("Checked {:?}: {} key(s)", path, report.len());
        Ok(FileCheck {
            path: path.to_path_buf(),
            dialect,
            report,
        })
    }

    fn read_source(&self, path: &Path, dialect: Dialect) -> Result<ConfigSource> {
        match (&self.preprocessor, dialect) {
            (Some(pre), Dialect::Compiled) => {
                if !path.is_file() {
                    return Err(Error::SourceUnavailable {
                        path: path.to_path_buf(),
                        reason: "no such file".to_string(),
                    });
                }
                tracing::debug!("Preprocessing {:?} with {}", path, pre.describe());
                let lines = pre.preprocess(path)?;
                Ok(ConfigSource::from_lines(path, dialect, lines))
            }
            _ => Ok(ConfigSource::read(path, dialect)?),
        }
    }

    fn check_duplicates(&self, path: &Path, blocks: &[KeyBlock]) -> Result<()> {
        let mut seen = HashSet::new();
        for block in blocks {
            if seen.insert(block.key.as_str()) {
                continue;
            }
            match self.config.run.duplicate_keys {
                DuplicatePolicy::Reject => {
                    return Err(Error::DuplicateKey {
                        key: block.key.clone(),
                        path: path.to_path_buf(),
                    });
                }
                DuplicatePolicy::Keep => {
                    tracing::warn!(
                        "Key {} appears more than once in {:?}; each occurrence is checked",
                        block.key,
                        path
                    );
                }
            }
        }
        Ok(())
    }

    fn reconcile_all(&self, blocks: &[KeyBlock]) -> Result<Vec<KeyOutcome>> {
        let reconciler = KeyReconciler::new(
            self.canonicalizer.as_ref(),
            self.diff.as_ref(),
            &self.normalize_rules,
        );

        let jobs = self.config.run.jobs.min(blocks.len());
        if jobs <= 1 {
            return blocks.iter().map(|b| reconciler.reconcile(b)).collect();
        }
        reconcile_parallel(reconciler, blocks, jobs)
    }
}

/// Reconcile `blocks` on `jobs` scoped workers.
///
/// Workers claim the next unclaimed index; the first failure raises the stop
/// flag so no new key is started. Calls already running finish normally.
fn reconcile_parallel(
    reconciler: KeyReconciler<'_>,
    blocks: &[KeyBlock],
    jobs: usize,
) -> Result<Vec<KeyOutcome>> {
    let next = AtomicUsize::new(0);
    let stop = AtomicBool::new(false);
    let (tx, rx) = mpsc::channel::<(usize, Result<KeyOutcome>)>();

    thread::scope(|scope| {
        for _ in 0..jobs {
            let tx = tx.clone();
            let next = &next;
            let stop = &stop;
            scope.spawn(move || {
                while !stop.load(Ordering::SeqCst) {
                    let idx = next.fetch_add(1, Ordering::SeqCst);
                    let Some(block) = blocks.get(idx) else {
                        break;
                    };
                    let result = reconciler.reconcile(block);
                    if result.is_err() {
                        stop.store(true, Ordering::SeqCst);
                    }
                    if tx.send((idx, result)).is_err() {
                        break;
                    }
                }
            });
        }
    });
    drop(tx);

    let mut slots: Vec<Option<KeyOutcome>> = vec![None; blocks.len()];
    let mut failure: Option<(usize, Error)> = None;
    for (idx, result) in rx {
        match result {
            Ok(outcome) => slots[idx] = Some(outcome),
            Err(e) => {
                // Report the failure of the earliest key
                if failure.as_ref().is_none_or(|(first, _)| idx < *first) {
                    failure = Some((idx, e));
                }
            }
        }
    }

    if let Some((idx, e)) = failure {
        tracing::debug!("Stopping run: key #{} failed", idx);
        return Err(e);
    }
    Ok(slots.into_iter().flatten().collect())
}
