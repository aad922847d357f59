//! Path splitter: turns file-bearing sections back into files on disk.
//!
//! Registers one handler for the `Configuration File` and `Log File` sections
//! of a supportconfig stream. The metadata line after each delimiter names the
//! embedded file; the handler resolves it to a safe path under the base
//! directory, creates the file (and any missing parents), and hands the
//! scanner a buffered sink for the section body.

use std::cell::RefCell;
use std::fs::{self, File};
use std::io::{BufRead, BufWriter, Write};
use std::path::{Component, Path, PathBuf};
use std::rc::Rc;

use crate::domain::{
    AppError, Result, SplitReport, WrittenFile, SECTION_CONFIGURATION_FILE, SECTION_LOG_FILE,
};

use super::scanner::{Parser, SectionAction};

/// Metadata lines naming an embedded file start with this prefix.
pub(crate) const METADATA_PREFIX: &str = "# ";

/// Marker in metadata lines for files that were not captured.
pub(crate) const FILE_NOT_FOUND: &str = "File not found";

/// Suffix of the ` - N Lines` annotation carried by included files.
pub(crate) const LINES_SUFFIX: &str = " Lines";

/// Caller-supplied hook that may rename, redirect, or drop a destination.
///
/// Called with the cleaned embedded path. `Ok(Some(path))` becomes the
/// destination (joined under the base directory), `Ok(None)` skips the
/// section, and an error aborts the whole split.
pub type PathRewriteFn = Box<dyn Fn(&Path) -> Result<Option<PathBuf>>>;

/// Splits a supportconfig stream into files under a base directory.
pub struct Splitter {
    base: PathBuf,
    rewrite: Option<PathRewriteFn>,
}

impl Splitter {
    /// Create a splitter writing under the given base directory.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self {
            base: base.into(),
            rewrite: None,
        }
    }

    /// Attach a path rewrite hook.
    #[must_use]
    pub fn with_rewrite(mut self, rewrite: PathRewriteFn) -> Self {
        self.rewrite = Some(rewrite);
        self
    }

    /// Split the stream, creating one file per resolvable section occurrence.
    ///
    /// # Errors
    /// Returns an error on any read, directory/file creation, or write
    /// failure, and when the rewrite hook rejects a path. Files already
    /// written stay on disk.
    pub fn split<R: BufRead>(&self, source: R) -> Result<SplitReport> {
        let report = Rc::new(RefCell::new(SplitReport::default()));

        let mut parser = Parser::new();
        for name in [SECTION_CONFIGURATION_FILE, SECTION_LOG_FILE] {
            let report = Rc::clone(&report);
            parser.register(
                name,
                Box::new(move |section, metadata| self.handle_section(section, metadata, &report)),
            );
        }
        parser.parse(source)?;
        drop(parser);

        Ok(Rc::try_unwrap(report).map_or_else(|shared| shared.borrow().clone(), RefCell::into_inner))
    }

    /// Resolve one metadata line into a sink, or decide to skip it.
    fn handle_section(
        &self,
        section: &str,
        metadata: &str,
        report: &Rc<RefCell<SplitReport>>,
    ) -> Result<SectionAction> {
        let Some(rest) = metadata.strip_prefix(METADATA_PREFIX) else {
            // Informational metadata, not a path.
            report.borrow_mut().skipped += 1;
            return Ok(SectionAction::Skip);
        };
        let Some(raw_path) = embedded_path(rest) else {
            report.borrow_mut().skipped += 1;
            return Ok(SectionAction::Skip);
        };
        let cleaned = clean_relative(raw_path);
        if cleaned.as_os_str().is_empty() {
            report.borrow_mut().skipped += 1;
            return Ok(SectionAction::Skip);
        }

        let dest = if let Some(rewrite) = &self.rewrite {
            match rewrite(&cleaned)? {
                Some(path) => path,
                None => {
                    // The caller deliberately ignores this section.
                    report.borrow_mut().skipped += 1;
                    return Ok(SectionAction::Ignore);
                }
            }
        } else {
            cleaned
        };

        let sink = self.create_sink(section, dest, report)?;
        Ok(SectionAction::Collect(Box::new(sink)))
    }

    /// Create the destination file (and missing parents) and wrap it in a
    /// buffered sink.
    fn create_sink(
        &self,
        section: &str,
        dest: PathBuf,
        report: &Rc<RefCell<SplitReport>>,
    ) -> Result<FileSink> {
        let path = join_under(&self.base, &dest);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                AppError::io(format!("Failed to create directory {}", parent.display()), e)
            })?;
        }
        let file = File::create(&path)
            .map_err(|e| AppError::io(format!("Failed to create {}", path.display()), e))?;

        tracing::debug!(section = %section, path = %path.display(), "Writing embedded file");

        Ok(FileSink {
            writer: BufWriter::new(file),
            rel_path: dest,
            lines: 0,
            report: Rc::clone(report),
        })
    }
}

/// Buffered sink for one destination file. Dropping it records the file in
/// the split report; the scanner flushes it before the drop.
struct FileSink {
    writer: BufWriter<File>,
    rel_path: PathBuf,
    lines: u64,
    report: Rc<RefCell<SplitReport>>,
}

impl Write for FileSink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let written = self.writer.write(buf)?;
        self.lines += buf[..written].iter().filter(|&&b| b == b'\n').count() as u64;
        Ok(written)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        self.report.borrow_mut().files.push(WrittenFile {
            path: std::mem::take(&mut self.rel_path),
            lines: self.lines,
        });
    }
}

/// Extract the embedded path from the remainder of a metadata line.
///
/// Returns `None` for "File not found" markers. Included files carry a
/// trailing ` - N Lines` annotation that is stripped; the ` - ` marker is
/// only honored past the first byte, so a pathless annotation stays intact.
pub(crate) fn embedded_path(rest: &str) -> Option<&str> {
    if rest.contains(FILE_NOT_FOUND) {
        return None;
    }
    if rest.ends_with(LINES_SUFFIX) {
        if let Some(idx) = rest.rfind(" - ") {
            if idx > 0 {
                return Some(&rest[..idx]);
            }
        }
    }
    Some(rest)
}

/// Clean an embedded path into a relative path that cannot escape the base
/// directory: root and `.` components are dropped, and `..` only pops
/// components that were already accepted.
pub(crate) fn clean_relative(raw: &str) -> PathBuf {
    let mut out = PathBuf::new();
    for component in Path::new(raw).components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::ParentDir => {
                out.pop();
            }
            Component::RootDir | Component::CurDir | Component::Prefix(_) => {}
        }
    }
    out
}

/// Join a destination onto the base directory, treating the destination as
/// relative even when it names the root.
fn join_under(base: &Path, dest: &Path) -> PathBuf {
    let mut out = base.to_path_buf();
    for component in dest.components() {
        match component {
            Component::RootDir | Component::Prefix(_) => {}
            other => out.push(other),
        }
    }
    out
}

/// Compile skip-prefix rules into a rewrite hook: any cleaned path starting
/// with one of the prefixes is skipped, everything else passes unchanged.
#[must_use]
pub fn skip_prefix_rewrite(prefixes: Vec<String>) -> PathRewriteFn {
    Box::new(move |path: &Path| {
        let text = path.to_string_lossy();
        if prefixes.iter().any(|prefix| text.starts_with(prefix.as_str())) {
            tracing::debug!(path = %text, "Skipped by rule");
            Ok(None)
        } else {
            Ok(Some(path.to_path_buf()))
        }
    })
}
