//! Output formatting for inventory listings and split reports.
//!
//! Supports table, JSON, and plain-path output.

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Table};

use crate::domain::{ArchiveEntry, SplitReport};

/// Output format options.
#[derive(Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    /// Human-readable table.
    #[default]
    Table,
    /// JSON for programmatic use.
    Json,
    /// One path per line, suitable for piping.
    Plain,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            "plain" | "paths" => Ok(Self::Plain),
            _ => Err(format!("Unknown format: {s}. Use: table, json, plain")),
        }
    }
}

/// Formats inventory entries as a table.
#[must_use]
pub fn format_inventory_table(entries: &[ArchiveEntry]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["#", "Kind", "Path", "Lines", "Status"]);

    for (i, entry) in entries.iter().enumerate() {
        let lines = entry.lines.map_or_else(String::new, |n| n.to_string());
        let status = if entry.found { "included" } else { "not found" };
        table.add_row(vec![
            (i + 1).to_string(),
            entry.kind.to_string(),
            entry.path.clone(),
            lines,
            status.to_string(),
        ]);
    }

    table.to_string()
}

/// Formats inventory entries as JSON.
///
/// # Errors
/// Returns error if serialization fails.
pub fn format_inventory_json(entries: &[ArchiveEntry]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(entries)
}

/// Formats inventory entries as bare paths, one per line.
#[must_use]
pub fn format_inventory_plain(entries: &[ArchiveEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        out.push_str(&entry.path);
        out.push('\n');
    }
    out
}

/// Formats a one-line summary of a split run.
#[must_use]
pub fn format_report_summary(report: &SplitReport) -> String {
    format!(
        "{} Wrote {} file(s), {} line(s), skipped {} section(s)",
        "✓".green().bold(),
        report.file_count(),
        report.total_lines(),
        report.skipped
    )
}
