//! keycheck CLI
//!
//! Checks configuration sources key by key against their canonical dumps.

mod cli;
mod commands;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;

use cli::Cli;
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("{}: logging unavailable: {}", "warning".yellow(), e);
    }
    tracing::debug!("Arguments: {:?}", cli);

    let cwd = std::env::current_dir()?;
    commands::run_check(&cwd, &cli.check_options())
}
