//! Check command implementation

use std::path::{Path, PathBuf};

use colored::Colorize;
use keycheck_core::report::{write_details, write_report};
use keycheck_core::{
    BackupManager, CheckEngine, ComparisonRecord, FileCheck, FileStatus, KeyStatus,
    KeycheckConfig,
};

use crate::error::{CliError, Result};

/// Options of one `keycheck` invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOptions {
    pub path: PathBuf,
    pub write: bool,
    pub backup: bool,
    pub config: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub jobs: Option<usize>,
}

/// Run a check from `cwd`
pub fn run_check(cwd: &Path, options: &CheckOptions) -> Result<()> {
    let path = cwd.join(&options.path);
    if !path.exists() {
        return Err(CliError::user(format!(
            "{} does not exist",
            options.path.display()
        )));
    }

    let mut config = KeycheckConfig::resolve(options.config.as_deref(), cwd)?;
    if let Some(jobs) = options.jobs {
        config.run.jobs = jobs;
    }
    let output_dir = options
        .output
        .as_ref()
        .map_or_else(|| cwd.to_path_buf(), |o| cwd.join(o));

    // Collaborators are located before the input is touched
    let engine = CheckEngine::from_config(config)?;

    if options.backup {
        let backup = BackupManager::new(&output_dir).create(&path)?;
        println!(
            "{} {} file(s) to {}",
            "Backed up".dimmed(),
            backup.metadata.files.len(),
            backup.path.display()
        );
    }

    if path.is_file() {
        check_single(&engine, &path, &output_dir, options.write)
    } else {
        check_directory(&engine, &path, &output_dir, options.write)
    }
}

fn check_single(engine: &CheckEngine, path: &Path, output_dir: &Path, write: bool) -> Result<()> {
    let check = engine.check_file(path)?;
    let name = path.display().to_string();

    if check.keys() == 0 {
        println!("{}: {}", name, "0 keys found".yellow());
        return Ok(());
    }

    let details = if write {
        let details = engine.config().details_path(output_dir);
        write_details(&details, check.report.records())?;
        Some(details)
    } else {
        None
    };

    match check.status() {
        FileStatus::Unchanged => {
            println!("{}: {}", name, "file matches".green().bold());
        }
        FileStatus::Updated => {
            // The listing is printed inline; --write also keeps it on disk
            let location = details
                .as_ref()
                .map_or_else(|| "below".to_string(), |d| d.display().to_string());
            println!(
                "{}: {} {}",
                name,
                "file differs, see report".yellow().bold(),
                location
            );
            print_changed_keys(&check);
        }
    }

    if let Some(details) = &details {
        println!("{} {}", "Details written to".dimmed(), details.display());
    }
    Ok(())
}

fn print_changed_keys(check: &FileCheck) {
    for record in changed(check.report.records()) {
        println!();
        println!("{} {}", status_label(record.status), record.key.bold());
        if let Some(detail) = &record.detail {
            for line in detail.lines() {
                println!("  {line}");
            }
        }
    }
}

fn check_directory(
    engine: &CheckEngine,
    root: &Path,
    output_dir: &Path,
    write: bool,
) -> Result<()> {
    let run = engine.check_dir(root)?;
    let rows = run.report.finalize();

    let report_path = engine.config().report_path(output_dir);
    write_report(&report_path, &rows)?;

    if write {
        write_details(&engine.config().details_path(output_dir), run.report.records())?;
    }

    let summaries = run.report.file_summaries();
    let changed_files = summaries
        .iter()
        .filter(|s| s.status() == FileStatus::Updated)
        .count();

    println!(
        "{} {} file(s), {} key(s)",
        "Checked".bold(),
        run.sources.len(),
        run.report.len()
    );
    println!(
        "  {} unchanged, {} updated, {} error(s)",
        run.report.count_status(KeyStatus::Unchanged).to_string().green(),
        run.report.count_status(KeyStatus::Updated).to_string().yellow(),
        run.report.count_status(KeyStatus::Error).to_string().red()
    );
    for summary in summaries.iter().filter(|s| s.status() == FileStatus::Updated) {
        println!(
            "  {} {}/{} ({} of {} key(s))",
            "~".yellow(),
            summary.path,
            summary.file,
            summary.updated + summary.errors,
            summary.keys()
        );
    }
    if changed_files == 0 {
        println!("{}", "All files match".green().bold());
    }
    println!("{} {}", "Report written to".dimmed(), report_path.display());
    Ok(())
}

fn changed(records: &[ComparisonRecord]) -> impl Iterator<Item = &ComparisonRecord> {
    records.iter().filter(|r| r.status != KeyStatus::Unchanged)
}

fn status_label(status: KeyStatus) -> colored::ColoredString {
    match status {
        KeyStatus::Unchanged => status.as_str().green(),
        KeyStatus::Updated => status.as_str().yellow(),
        KeyStatus::Error => status.as_str().red(),
    }
}
