//! Per-key reconciliation
//!
//! Each key walks `Pending -> Canonicalized -> Done`. The canonicalizer is
//! called exactly once per key and the diff tool at most once; nothing is
//! retried.

use keycheck_blocks::{KeyBlock, NormalizeRules, normalize_pair};

use crate::Result;
use crate::collaborator::{CanonicalDump, Canonicalizer, DiffOutcome, DiffTool};
use crate::report::KeyStatus;

/// Classification of one key plus what explains it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyOutcome {
    pub status: KeyStatus,
    /// Diff listing for `KEY_UPDATED`, canonicalizer error text for `KEY_ERROR`.
    pub detail: Option<String>,
}

impl KeyOutcome {
    fn unchanged() -> Self {
        Self {
            status: KeyStatus::Unchanged,
            detail: None,
        }
    }
}

/// Where a key is in its reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileState {
    Pending,
    Canonicalized(CanonicalDump),
    Done(KeyOutcome),
}

/// Reconciles key blocks against their canonical dumps.
#[derive(Clone, Copy)]
pub struct KeyReconciler<'a> {
    canonicalizer: &'a dyn Canonicalizer,
    diff: &'a dyn DiffTool,
    rules: &'a NormalizeRules,
}

impl<'a> KeyReconciler<'a> {
    pub fn new(
        canonicalizer: &'a dyn Canonicalizer,
        diff: &'a dyn DiffTool,
        rules: &'a NormalizeRules,
    ) -> Self {
        Self {
            canonicalizer,
            diff,
            rules,
        }
    }

    /// Run `block` to completion.
    ///
    /// Only collaborator breakage is an `Err`; a key the canonicalizer cannot
    /// resolve is a `KEY_ERROR` outcome.
    pub fn reconcile(&self, block: &KeyBlock) -> Result<KeyOutcome> {
        let mut state = ReconcileState::Pending;
        loop {
            state = match state {
                ReconcileState::Pending => self.step_pending(block)?,
                ReconcileState::Canonicalized(dump) => self.step_canonicalized(block, dump)?,
                ReconcileState::Done(outcome) => return Ok(outcome),
            };
        }
    }

    fn step_pending(&self, block: &KeyBlock) -> Result<ReconcileState> {
        let dump = self.canonicalizer.canonicalize(&block.key)?;
        Ok(ReconcileState::Canonicalized(dump))
    }

    fn step_canonicalized(&self, block: &KeyBlock, dump: CanonicalDump) -> Result<ReconcileState> {
        // An empty key has nothing to disagree with, whatever the dump says
        if block.is_empty {
            tracing::debug!("Key {} is empty, classified unchanged", block.key);
            return Ok(ReconcileState::Done(KeyOutcome::unchanged()));
        }
        if dump.failed {
            tracing::debug!("Key {} could not be canonicalized", block.key);
            return Ok(ReconcileState::Done(KeyOutcome {
                status: KeyStatus::Error,
                detail: dump.error_text,
            }));
        }

        let (source, canonical) = normalize_pair(&block.lines, &dump.lines, self.rules);
        let outcome = match self.diff.diff(&source, &canonical)? {
            DiffOutcome::Identical => KeyOutcome::unchanged(),
            DiffOutcome::Differs(listing) => KeyOutcome {
                status: KeyStatus::Updated,
                detail: Some(listing),
            },
        };
        tracing::debug!("Key {} classified {}", block.key, outcome.status);
        Ok(ReconcileState::Done(outcome))
    }
}
