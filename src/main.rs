//! # photo-dedup CLI
//!
//! Command-line interface for the media indexer.
//!
//! ## Usage
//! ```bash
//! photo-dedup scan ~/Pictures --threads 8
//! photo-dedup dedup --keep newest --export duplicates.csv
//! photo-dedup report --json
//! ```

mod cli;

use console::style;
use std::process::ExitCode;

fn main() -> ExitCode {
    match cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("error:").red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
