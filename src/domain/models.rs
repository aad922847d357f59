//! Domain models for supportconfig archives.
//!
//! These models represent the entries embedded in a supportconfig stream and
//! the results of splitting one into files.

use std::path::PathBuf;

use serde::Serialize;

/// Section name used for embedded configuration files.
pub const SECTION_CONFIGURATION_FILE: &str = "Configuration File";

/// Section name used for embedded log files.
pub const SECTION_LOG_FILE: &str = "Log File";

/// The kind of file-bearing section in a supportconfig archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    /// A `Configuration File` section.
    Configuration,
    /// A `Log File` section.
    Log,
}

impl SectionKind {
    /// Section name as it appears in delimiter lines.
    #[must_use]
    pub const fn section_name(self) -> &'static str {
        match self {
            Self::Configuration => SECTION_CONFIGURATION_FILE,
            Self::Log => SECTION_LOG_FILE,
        }
    }

    /// Parse a delimiter section name into a kind, if it is file-bearing.
    #[must_use]
    pub fn from_section_name(name: &str) -> Option<Self> {
        match name {
            SECTION_CONFIGURATION_FILE => Some(Self::Configuration),
            SECTION_LOG_FILE => Some(Self::Log),
            _ => None,
        }
    }
}

impl std::fmt::Display for SectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Configuration => write!(f, "config"),
            Self::Log => write!(f, "log"),
        }
    }
}

/// One file-bearing section occurrence found while scanning an archive.
#[derive(Debug, Clone, Serialize)]
pub struct ArchiveEntry {
    /// Which section kind announced this entry.
    pub kind: SectionKind,
    /// The embedded path, as written in the metadata line (after cleanup).
    pub path: String,
    /// Whether the file was captured (false for "File not found" markers).
    pub found: bool,
    /// Line count from the ` - N Lines` annotation, when present and numeric.
    pub lines: Option<u64>,
}

/// A single destination file produced by a split.
#[derive(Debug, Clone, Serialize)]
pub struct WrittenFile {
    /// Path relative to the base output directory.
    pub path: PathBuf,
    /// Number of body lines streamed into the file.
    pub lines: u64,
}

/// Summary of one split run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SplitReport {
    /// Files created, in stream order.
    pub files: Vec<WrittenFile>,
    /// Section occurrences that were skipped (not actionable or filtered out).
    pub skipped: usize,
}

impl SplitReport {
    /// Total number of files created.
    #[must_use]
    pub const fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Total body lines written across all files.
    #[must_use]
    pub fn total_lines(&self) -> u64 {
        self.files.iter().map(|f| f.lines).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_kind_round_trip() {
        for kind in [SectionKind::Configuration, SectionKind::Log] {
            assert_eq!(SectionKind::from_section_name(kind.section_name()), Some(kind));
        }
        assert_eq!(SectionKind::from_section_name("Verification"), None);
    }

    #[test]
    fn test_report_totals() {
        let report = SplitReport {
            files: vec![
                WrittenFile {
                    path: PathBuf::from("etc/foo.conf"),
                    lines: 3,
                },
                WrittenFile {
                    path: PathBuf::from("var/log/messages"),
                    lines: 7,
                },
            ],
            skipped: 1,
        };
        assert_eq!(report.file_count(), 2);
        assert_eq!(report.total_lines(), 10);
    }
}
