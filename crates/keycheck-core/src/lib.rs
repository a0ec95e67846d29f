//! Key-level reconciliation engine for keycheck
//!
//! Every key of a configuration source is compared with the dump an external
//! canonicalizer produces for it. The outcome of each comparison is recorded,
//! and the records of a whole run are aggregated into a report.
//!
//! ```text
//! source --extract--> key blocks --reconcile--> records --finalize--> report rows
//!                                    |
//!                     canonicalizer + diff tool
//! ```

pub mod backup;
pub mod collaborator;
pub mod config;
pub mod engine;
pub mod error;
pub mod reconcile;
pub mod report;

pub use backup::{BackupManager, BackupMetadata, SourceBackup};
pub use collaborator::{CanonicalDump, Canonicalizer, DiffOutcome, DiffTool, Preprocessor};
pub use config::{CommandSpec, DuplicatePolicy, KeycheckConfig};
pub use engine::{CheckEngine, CheckRun, CheckedSource, FileCheck};
pub use error::{Error, Result};
pub use reconcile::{KeyOutcome, KeyReconciler, ReconcileState};
pub use report::{ComparisonRecord, FileStatus, FileSummary, KeyStatus, Report, ReportRow};
