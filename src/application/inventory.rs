//! Archive inventory: enumerate embedded files without writing anything.
//!
//! Scans the same sections the splitter consumes, but only records what the
//! metadata lines announce: path, whether the file was captured, and the
//! ` - N Lines` annotation when it parses.

use std::cell::RefCell;
use std::io::BufRead;
use std::rc::Rc;

use crate::domain::{
    ArchiveEntry, Result, SectionKind, SECTION_CONFIGURATION_FILE, SECTION_LOG_FILE,
};

use super::scanner::{Parser, SectionAction};
use super::splitter::{clean_relative, embedded_path, FILE_NOT_FOUND, LINES_SUFFIX, METADATA_PREFIX};

/// Scan the stream and list every file-bearing section occurrence.
///
/// # Errors
/// Returns an error if the underlying stream read fails.
pub fn scan_inventory<R: BufRead>(source: R) -> Result<Vec<ArchiveEntry>> {
    let entries: Rc<RefCell<Vec<ArchiveEntry>>> = Rc::default();

    let mut parser = Parser::new();
    for name in [SECTION_CONFIGURATION_FILE, SECTION_LOG_FILE] {
        let entries = Rc::clone(&entries);
        parser.register(
            name,
            Box::new(move |section, metadata| {
                if let Some(entry) = entry_from_metadata(section, metadata) {
                    entries.borrow_mut().push(entry);
                    Ok(SectionAction::Ignore)
                } else {
                    Ok(SectionAction::Skip)
                }
            }),
        );
    }
    parser.parse(source)?;
    drop(parser);

    Ok(Rc::try_unwrap(entries).map_or_else(|shared| shared.borrow().clone(), RefCell::into_inner))
}

/// Interpret one metadata line as an inventory entry.
fn entry_from_metadata(section: &str, metadata: &str) -> Option<ArchiveEntry> {
    let kind = SectionKind::from_section_name(section)?;
    let rest = metadata.strip_prefix(METADATA_PREFIX)?;

    if rest.contains(FILE_NOT_FOUND) {
        let path = annotation_start(rest).map_or(rest, |idx| &rest[..idx]);
        let cleaned = clean_relative(path);
        if cleaned.as_os_str().is_empty() {
            return None;
        }
        return Some(ArchiveEntry {
            kind,
            path: cleaned.to_string_lossy().into_owned(),
            found: false,
            lines: None,
        });
    }

    let lines = line_count(rest);
    let cleaned = clean_relative(embedded_path(rest)?);
    if cleaned.as_os_str().is_empty() {
        return None;
    }
    Some(ArchiveEntry {
        kind,
        path: cleaned.to_string_lossy().into_owned(),
        found: true,
        lines,
    })
}

/// Offset of the last ` - ` annotation marker, when it is usable.
fn annotation_start(rest: &str) -> Option<usize> {
    rest.rfind(" - ").filter(|&idx| idx > 0)
}

/// Parse the `N` out of a trailing ` - N Lines` annotation.
fn line_count(rest: &str) -> Option<u64> {
    let idx = annotation_start(rest)?;
    rest[idx + 3..].strip_suffix(LINES_SUFFIX)?.trim().parse().ok()
}
