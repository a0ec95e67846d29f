//! CSV report and detail file rendering

use std::fmt::Write as _;
use std::path::Path;

use super::model::{ComparisonRecord, KeyStatus, ReportRow};
use crate::{Error, Result};

/// Header row of the CSV report.
pub const REPORT_HEADER: [&str; 8] = [
    "Path",
    "File",
    "Key",
    "Key_chg",
    "File_key_nb",
    "File_chg",
    "Key_dbl",
    "File_dbl",
];

/// Render finalized rows as `;`-delimited CSV. The header is always present.
pub fn render_csv(rows: &[ReportRow]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(REPORT_HEADER)?;
    for row in rows {
        writer.serialize(row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| Error::Io(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Write the CSV report to `path` atomically.
pub fn write_report(path: &Path, rows: &[ReportRow]) -> Result<()> {
    let content = render_csv(rows)?;
    keycheck_fs::io::write_text(path, &content)?;
    tracing::info!("Wrote report with {} row(s) to {:?}", rows.len(), path);
    Ok(())
}

/// Render the detail of every key that is not unchanged.
pub fn render_details(records: &[ComparisonRecord]) -> String {
    let mut out = String::new();
    for record in records.iter().filter(|r| r.status != KeyStatus::Unchanged) {
        let _ = writeln!(
            out,
            "=== {}/{} [{}] {}",
            record.path, record.file, record.key, record.status
        );
        if let Some(detail) = &record.detail {
            out.push_str(detail);
            if !detail.ends_with('\n') {
                out.push('\n');
            }
        }
        out.push('\n');
    }
    out
}

/// Write the detail file to `path` atomically.
pub fn write_details(path: &Path, records: &[ComparisonRecord]) -> Result<()> {
    keycheck_fs::io::write_text(path, &render_details(records))?;
    tracing::info!("Wrote key details to {:?}", path);
    Ok(())
}
