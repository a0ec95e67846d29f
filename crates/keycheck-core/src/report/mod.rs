//! Comparison records and the directory-wide report
//!
//! Records are pushed as keys are reconciled ([`Report::push`]); the derived
//! statistics are computed in a second pass ([`Report::finalize`]) once every
//! file has been processed.

mod aggregate;
mod model;
mod writer;

pub use aggregate::Report;
pub use model::{ComparisonRecord, FileStatus, FileSummary, KeyStatus, ReportRow};
pub use writer::{REPORT_HEADER, render_csv, render_details, write_details, write_report};
