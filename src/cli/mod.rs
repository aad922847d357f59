//! CLI interface using clap.
//!
//! Provides command-line arguments and subcommands for the tool.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::application::OutputFormat;

/// scsplit - split supportconfig archives back into their original files.
#[derive(Parser, Debug)]
#[command(name = "scsplit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging (use multiple times for more verbosity).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Output format for listings: table, json, or plain.
    #[arg(short, long, default_value = "table")]
    pub format: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Split an archive into a directory tree.
    Split {
        /// Archive file to read ('-' or omitted for stdin).
        input: Option<PathBuf>,

        /// Base output directory (overrides the configured default).
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip embedded paths starting with this prefix (repeatable,
        /// combined with the configured skip rules).
        #[arg(long, value_name = "PREFIX")]
        skip: Vec<String>,
    },

    /// List the files embedded in an archive without extracting them.
    List {
        /// Archive file to read ('-' or omitted for stdin).
        input: Option<PathBuf>,

        /// Only list files that were actually captured.
        #[arg(long)]
        found_only: bool,
    },

    /// Show the configuration file location, creating a default if missing.
    ConfigPath,
}

impl Cli {
    /// Parse the output format argument.
    pub fn output_format(&self) -> Result<OutputFormat, String> {
        self.format.parse()
    }
}
