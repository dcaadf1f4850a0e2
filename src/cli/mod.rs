use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod classify;
mod info;

/// anyform - Universal File-Format Ingestion
#[derive(Parser)]
#[command(name = "anyform")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a file and print its envelope summary
    Info {
        /// Input file path
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Override the MIME type used for classification fallback
        #[arg(short, long, default_value = "")]
        mime: String,

        /// Print the full metadata record as JSON
        #[arg(long)]
        json: bool,
    },

    /// Classify a file by name and MIME type without decoding it
    Classify {
        /// Input file path (the file does not have to exist)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Override the MIME type used for classification fallback
        #[arg(short, long, default_value = "")]
        mime: String,
    },
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Info { file, mime, json } => info::run(file, mime, json),
        Commands::Classify { file, mime } => classify::run(file, mime),
    }
}
