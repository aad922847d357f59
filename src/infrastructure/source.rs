//! Input stream handling.
//!
//! Opens the archive to split, either from a file path or from stdin.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::domain::{AppError, Result};

/// Open the archive input as a buffered reader.
///
/// `None` or `-` reads from stdin.
///
/// # Errors
/// Returns error if the file cannot be opened.
pub fn open_source(path: Option<&Path>) -> Result<Box<dyn BufRead>> {
    match path {
        Some(path) if path.as_os_str() != "-" => {
            let file = File::open(path)
                .map_err(|e| AppError::io(format!("Failed to open {}", path.display()), e))?;
            tracing::debug!(path = %path.display(), "Reading archive from file");
            Ok(Box::new(BufReader::new(file)))
        }
        _ => {
            tracing::debug!("Reading archive from stdin");
            Ok(Box::new(BufReader::new(io::stdin())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_open_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("archive.txt");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "#==[ Log File ]===").unwrap();

        let mut reader = open_source(Some(&path)).unwrap();
        let mut line = String::new();
        reader.read_line(&mut line).unwrap();
        assert_eq!(line, "#==[ Log File ]===\n");
    }

    #[test]
    fn test_open_missing_file_errors() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.txt");
        assert!(open_source(Some(&missing)).is_err());
    }
}
