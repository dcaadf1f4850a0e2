//! # anyform CLI
//!
//! Command-line front end for the `anyform` ingestion library.
//!
//! ## Usage
//!
//! ```bash
//! # Classify a file without decoding it
//! anyform classify scan.nii
//!
//! # Decode a file and print its envelope summary
//! anyform info recording.edf
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}
