//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::Parser;

use crate::commands::CheckOptions;

/// keycheck - Compare configuration sources with their canonical dumps
///
/// A file argument checks that file and prints whether it matches.
/// A directory argument checks every source below it and writes a CSV report.
#[derive(Parser, Debug)]
#[command(name = "keycheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Source file or directory to check
    pub path: PathBuf,

    /// Also write the diff or error of every changed key to a .diff file
    #[arg(short, long)]
    pub write: bool,

    /// Copy the input to <output>/.keycheck-backup/<timestamp>/ before checking
    #[arg(short, long)]
    pub backup: bool,

    /// Configuration file (default: ./keycheck.toml when present)
    #[arg(short, long, value_name = "FILE", env = "KEYCHECK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory receiving the report, details and backups (default: current directory)
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Keys reconciled in parallel (overrides run.jobs)
    #[arg(short, long, value_name = "N", value_parser = clap::value_parser!(u16).range(1..))]
    pub jobs: Option<u16>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn check_options(&self) -> CheckOptions {
        CheckOptions {
            path: self.path.clone(),
            write: self.write,
            backup: self.backup,
            config: self.config.clone(),
            output: self.output.clone(),
            jobs: self.jobs.map(usize::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_all_flags() {
        let cli = Cli::try_parse_from([
            "keycheck", "--write", "--backup", "--config", "k.toml", "--output", "out", "--jobs",
            "4", "-v", "conf",
        ])
        .unwrap();

        assert!(cli.write && cli.backup && cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("k.toml")));
        assert_eq!(cli.output, Some(PathBuf::from("out")));
        assert_eq!(cli.check_options().jobs, Some(4));
        assert_eq!(cli.path, PathBuf::from("conf"));
    }

    #[test]
    fn parse_rejects_zero_jobs() {
        assert!(Cli::try_parse_from(["keycheck", "--jobs", "0", "conf"]).is_err());
    }

    #[test]
    fn parse_requires_path() {
        assert!(Cli::try_parse_from(["keycheck"]).is_err());
    }
}
