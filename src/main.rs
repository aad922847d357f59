//! scsplit - split supportconfig archives back into their original files.
//!
//! A supportconfig diagnostic bundle embeds configuration and log files in
//! one concatenated text stream. This tool re-splits that stream into a
//! directory tree, preserving the embedded relative paths.
//!
//! QUICK START:
//!   scsplit split bundle.txt -o ./out      # Extract into ./out
//!   scsplit list bundle.txt                # See what the bundle contains
//!   scsplit split --skip proc/ < bundle    # Extract from stdin, skip proc/
//!   scsplit config-path                    # Where the config file lives

mod application;
mod cli;
mod domain;
mod infrastructure;

use std::path::{Path, PathBuf};

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use application::{
    format_inventory_json, format_inventory_plain, format_inventory_table, format_report_summary,
    scan_inventory, skip_prefix_rewrite, OutputFormat, Splitter,
};
use cli::{Cli, Commands};
use infrastructure::{config_file_path, ensure_config_exists, load_config, open_source};

fn main() {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

/// Main application logic.
fn run(cli: Cli) -> domain::Result<()> {
    let format = cli
        .output_format()
        .map_err(|e| domain::AppError::Config { message: e })?;

    match cli.command {
        Commands::Split {
            input,
            output,
            skip,
        } => {
            cmd_split(input.as_deref(), output, skip)?;
        }
        Commands::List { input, found_only } => {
            cmd_list(input.as_deref(), found_only, format)?;
        }
        Commands::ConfigPath => {
            cmd_config_path()?;
        }
    }

    Ok(())
}

/// Split an archive into files under the base directory.
fn cmd_split(
    input: Option<&Path>,
    output: Option<PathBuf>,
    skip: Vec<String>,
) -> domain::Result<()> {
    let config = load_config()?;

    let base = output.unwrap_or(config.output.base_dir);
    let mut prefixes = config.rules.skip;
    prefixes.extend(skip);

    let source = open_source(input)?;

    let mut splitter = Splitter::new(&base);
    if !prefixes.is_empty() {
        splitter = splitter.with_rewrite(skip_prefix_rewrite(prefixes));
    }

    let report = splitter.split(source)?;

    for file in &report.files {
        println!(
            "{} {} ({} lines)",
            "✓".green(),
            file.path.display().to_string().cyan(),
            file.lines
        );
    }
    println!();
    println!("{} under {}", format_report_summary(&report), base.display());

    Ok(())
}

/// List the embedded files in an archive.
fn cmd_list(input: Option<&Path>, found_only: bool, format: OutputFormat) -> domain::Result<()> {
    let source = open_source(input)?;

    let mut entries = scan_inventory(source)?;
    if found_only {
        entries.retain(|e| e.found);
    }

    let output = match format {
        OutputFormat::Table => format_inventory_table(&entries),
        OutputFormat::Json => {
            format_inventory_json(&entries).map_err(|e| domain::AppError::InvalidData {
                message: format!("Failed to serialize inventory: {e}"),
            })?
        }
        OutputFormat::Plain => format_inventory_plain(&entries),
    };

    print!("{output}");
    if matches!(format, OutputFormat::Table | OutputFormat::Json) {
        println!();
        println!("Total: {} file(s)", entries.len());
    }

    Ok(())
}

/// Show the configuration file path.
fn cmd_config_path() -> domain::Result<()> {
    ensure_config_exists()?;
    println!("{}", config_file_path().display());
    Ok(())
}

/// Setup tracing/logging based on verbosity level.
fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(filter)
        .init();
}
