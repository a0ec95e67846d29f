//! Two-pass report aggregation

use std::collections::{BTreeSet, HashMap};
use std::path::{Component, Path};

use super::model::{ComparisonRecord, FileStatus, FileSummary, KeyStatus, ReportRow};

/// All records of a run with lookup indexes.
#[derive(Debug, Clone, Default)]
pub struct Report {
    records: Vec<ComparisonRecord>,
    by_key: HashMap<String, Vec<usize>>,
    by_status: HashMap<KeyStatus, Vec<usize>>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record and index it.
    pub fn push(&mut self, record: ComparisonRecord) {
        let idx = self.records.len();
        self.by_key.entry(record.key.clone()).or_default().push(idx);
        self.by_status.entry(record.status).or_default().push(idx);
        self.records.push(record);
    }

    /// Append every record of `other`, keeping its order.
    pub fn merge(&mut self, other: Report) {
        for record in other.records {
            self.push(record);
        }
    }

    pub fn records(&self) -> &[ComparisonRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records holding `key`, in push order.
    pub fn records_for_key(&self, key: &str) -> Vec<&ComparisonRecord> {
        self.by_key
            .get(key)
            .map(|ids| ids.iter().map(|&i| &self.records[i]).collect())
            .unwrap_or_default()
    }

    /// Number of records with `status`.
    pub fn count_status(&self, status: KeyStatus) -> usize {
        self.by_status.get(&status).map_or(0, Vec::len)
    }

    /// Compute the derived columns for every record.
    pub fn finalize(&self) -> Vec<ReportRow> {
        self.records
            .iter()
            .map(|record| {
                let ids = self.by_key.get(&record.key).map(Vec::as_slice).unwrap_or(&[]);
                let key_occurrence_count = ids.len();
                let unchanged = ids
                    .iter()
                    .filter(|&&i| self.records[i].status == KeyStatus::Unchanged)
                    .count();
                let file_aggregate_status = if unchanged == key_occurrence_count {
                    FileStatus::Unchanged
                } else {
                    FileStatus::Updated
                };
                let siblings = sibling_files(ids.iter().map(|&i| &self.records[i]));

                ReportRow {
                    path: record.path.clone(),
                    file: record.file.clone(),
                    key: record.key.clone(),
                    status: record.status,
                    key_occurrence_count,
                    file_aggregate_status,
                    status_occurrence_count: self.count_status(record.status),
                    sibling_files_for_key: siblings,
                }
            })
            .collect()
    }

    /// Per-file counts, in order of first appearance.
    pub fn file_summaries(&self) -> Vec<FileSummary> {
        let mut summaries: Vec<FileSummary> = Vec::new();
        let mut index: HashMap<(&str, &str), usize> = HashMap::new();

        for record in &self.records {
            let slot = *index
                .entry((record.path.as_str(), record.file.as_str()))
                .or_insert_with(|| {
                    summaries.push(FileSummary {
                        path: record.path.clone(),
                        file: record.file.clone(),
                        unchanged: 0,
                        updated: 0,
                        errors: 0,
                    });
                    summaries.len() - 1
                });

            let summary = &mut summaries[slot];
            match record.status {
                KeyStatus::Unchanged => summary.unchanged += 1,
                KeyStatus::Updated => summary.updated += 1,
                KeyStatus::Error => summary.errors += 1,
            }
        }
        summaries
    }
}

/// Distinct `(path, file)` pairs holding a key, sorted and joined with `,`.
///
/// Entries are shown relative to the deepest directory shared by all of them,
/// so files of one directory appear as bare names and equal names in
/// different directories stay apart.
fn sibling_files<'a>(records: impl Iterator<Item = &'a ComparisonRecord>) -> String {
    let distinct: BTreeSet<(&str, &str)> = records
        .map(|r| (r.path.as_str(), r.file.as_str()))
        .collect();

    let mut dirs = distinct.iter().map(|(path, _)| Path::new(*path));
    let Some(first) = dirs.next() else {
        return String::new();
    };
    let shared = dirs.fold(first.components().count(), |depth, dir| {
        depth.min(
            first
                .components()
                .zip(dir.components())
                .take_while(|(a, b)| a == b)
                .count(),
        )
    });

    let entries: BTreeSet<String> = distinct
        .iter()
        .map(|(path, file)| {
            let rest: Vec<String> = Path::new(*path)
                .components()
                .skip(shared)
                .filter(|c| !matches!(c, Component::CurDir))
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .chain(std::iter::once(file.to_string()))
                .collect();
            rest.join("/")
        })
        .collect();
    entries.into_iter().collect::<Vec<_>>().join(",")
}
