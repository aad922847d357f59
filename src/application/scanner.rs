//! Section scanner for supportconfig streams.
//!
//! A supportconfig archive is one long line-oriented stream with embedded
//! logical files. Each file starts with a delimiter line of the form
//! `#==[ Section Name ]=========`, immediately followed by a metadata line,
//! and then the file body until the next delimiter. The scanner recognizes
//! delimiters, offers the metadata line to every handler registered for the
//! section name, and streams body lines into the sinks those handlers return.

use std::collections::HashMap;
use std::io::{BufRead, Write};
use std::sync::OnceLock;

use regex::bytes::Regex;

use crate::domain::{AppError, Result};

/// Literal prefix every delimiter line carries.
const DELIMITER_PREFIX: &[u8] = b"#==[ ";

/// What a handler decided to do with one section occurrence.
pub enum SectionAction {
    /// Stream the section body into this sink, one newline-terminated line
    /// at a time. The scanner owns the sink and closes it exactly once.
    Collect(Box<dyn Write>),
    /// Observe the metadata but collect nothing.
    Ignore,
    /// This occurrence is not actionable for the handler; handlers registered
    /// after it still run.
    Skip,
}

/// Handler invoked once per occurrence of its registered section, with the
/// section name and the metadata line that follows the delimiter.
pub type HandlerFn<'a> = Box<dyn FnMut(&str, &str) -> Result<SectionAction> + 'a>;

/// Position of the scan relative to section boundaries.
enum ScanState {
    /// No delimiter seen yet (or the stream is between malformed markers).
    AwaitingSection,
    /// A delimiter was just seen; the next line is section metadata.
    AwaitingMetadata,
    /// Metadata dispatched; every further line is section body.
    InBody,
}

/// Line scanner that drives registered section handlers.
///
/// Handlers must be registered before [`Parser::parse`] is called; the
/// registration table is not consulted for changes mid-parse.
pub struct Parser<'a> {
    handlers: HashMap<String, Vec<HandlerFn<'a>>>,
}

impl<'a> Parser<'a> {
    /// Create a parser with an empty registration table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Append a handler for a section name. Handlers for the same name run
    /// in registration order.
    pub fn register(&mut self, section: impl Into<String>, handler: HandlerFn<'a>) {
        self.handlers.entry(section.into()).or_default().push(handler);
    }

    /// Consume the stream to exhaustion, dispatching sections to handlers.
    ///
    /// Lines are split on a bare `\n`; a trailing `\r` is payload, not part
    /// of the terminator, and the final line is delivered even when it is
    /// unterminated. Every sink opened during the parse is closed exactly
    /// once, either when the next delimiter is seen or at end of stream.
    ///
    /// # Errors
    /// Returns an error if the underlying read fails, if a sink write or
    /// flush fails, or if a handler returns an error.
    pub fn parse<R: BufRead>(&mut self, mut source: R) -> Result<()> {
        let mut state = ScanState::AwaitingSection;
        let mut section = String::new();
        let mut sinks: Vec<Box<dyn Write>> = Vec::new();
        let mut buf = Vec::new();

        loop {
            buf.clear();
            let read = source
                .read_until(b'\n', &mut buf)
                .map_err(|e| AppError::io("Failed to read archive stream", e))?;
            if read == 0 {
                break;
            }
            let line = trim_terminator(&buf);

            if line.starts_with(DELIMITER_PREFIX) {
                if let Some(name) = delimiter_name(line) {
                    close_sinks(&mut sinks)?;
                    tracing::debug!(section = %name, "Entering section");
                    section = name;
                    state = ScanState::AwaitingMetadata;
                }
                // A line carrying the marker prefix but failing the full
                // delimiter pattern belongs to no section.
                continue;
            }

            match state {
                // Lines before the first delimiter carry no section.
                ScanState::AwaitingSection => {}
                ScanState::AwaitingMetadata => {
                    let metadata = String::from_utf8_lossy(line).into_owned();
                    self.dispatch(&section, &metadata, &mut sinks)?;
                    state = ScanState::InBody;
                }
                ScanState::InBody => {
                    for sink in &mut sinks {
                        sink.write_all(line)
                            .and_then(|()| sink.write_all(b"\n"))
                            .map_err(|e| AppError::io("Failed to write section body", e))?;
                    }
                }
            }
        }

        close_sinks(&mut sinks)
    }

    /// Offer the metadata line to every handler registered for the section,
    /// in registration order, collecting the sinks they return.
    fn dispatch(
        &mut self,
        section: &str,
        metadata: &str,
        sinks: &mut Vec<Box<dyn Write>>,
    ) -> Result<()> {
        let Some(handlers) = self.handlers.get_mut(section) else {
            return Ok(());
        };
        for handler in handlers {
            match handler(section, metadata)? {
                SectionAction::Collect(sink) => sinks.push(sink),
                SectionAction::Ignore | SectionAction::Skip => {}
            }
        }
        Ok(())
    }
}

impl Default for Parser<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// Strip the `\n` terminator, keeping any `\r` as payload.
fn trim_terminator(buf: &[u8]) -> &[u8] {
    buf.strip_suffix(b"\n").unwrap_or(buf)
}

/// Extract the section name from a delimiter line, e.g.
/// `#==[ Log File ]=========` yields `Log File`.
fn delimiter_name(line: &[u8]) -> Option<String> {
    let captures = delimiter_re().captures(line)?;
    let name = captures.get(1)?;
    Some(String::from_utf8_lossy(name.as_bytes()).into_owned())
}

#[allow(clippy::expect_used)]
fn delimiter_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"#==\[ (.*?) \]=+").expect("delimiter pattern is valid"))
}

/// Flush and drop every open sink, in the order they were opened.
fn close_sinks(sinks: &mut Vec<Box<dyn Write>>) -> Result<()> {
    for mut sink in sinks.drain(..) {
        sink.flush()
            .map_err(|e| AppError::io("Failed to flush section sink", e))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::io::Cursor;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct SharedBuf(Rc<RefCell<Vec<u8>>>);

    impl SharedBuf {
        fn contents(&self) -> String {
            String::from_utf8(self.0.borrow().clone()).unwrap()
        }
    }

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn collect_into(buf: &SharedBuf) -> HandlerFn<'static> {
        let buf = buf.clone();
        Box::new(move |_, _| Ok(SectionAction::Collect(Box::new(buf.clone()))))
    }

    #[test]
    fn test_body_lines_forwarded_with_newlines() {
        let input = "#==[ Configuration File ]=========\n# etc/foo.conf\nline one\nline two\n";
        let buf = SharedBuf::default();
        let mut parser = Parser::new();
        parser.register("Configuration File", collect_into(&buf));
        parser.parse(Cursor::new(input)).unwrap();
        assert_eq!(buf.contents(), "line one\nline two\n");
    }

    #[test]
    fn test_unterminated_final_line_delivered() {
        let input = "#==[ Log File ]===\n# meta\nfirst\nlast without newline";
        let buf = SharedBuf::default();
        let mut parser = Parser::new();
        parser.register("Log File", collect_into(&buf));
        parser.parse(Cursor::new(input)).unwrap();
        assert_eq!(buf.contents(), "first\nlast without newline\n");
    }

    #[test]
    fn test_carriage_return_is_payload() {
        let input = "#==[ Log File ]===\n# meta\ndos line\r\n";
        let buf = SharedBuf::default();
        let mut parser = Parser::new();
        parser.register("Log File", collect_into(&buf));
        parser.parse(Cursor::new(input)).unwrap();
        assert_eq!(buf.contents(), "dos line\r\n");
    }

    #[test]
    fn test_lines_before_first_delimiter_discarded() {
        let input = "preamble\nmore preamble\n#==[ Log File ]===\n# meta\nbody\n";
        let buf = SharedBuf::default();
        let mut parser = Parser::new();
        parser.register("Log File", collect_into(&buf));
        parser.parse(Cursor::new(input)).unwrap();
        assert_eq!(buf.contents(), "body\n");
    }

    #[test]
    fn test_handlers_run_in_registration_order_and_skip_continues() {
        let input = "#==[ Log File ]===\n# meta line\nbody\n";
        let calls: Rc<RefCell<Vec<String>>> = Rc::default();
        let mut parser = Parser::new();
        for (label, action) in [
            ("first", SectionAction::Skip),
            ("second", SectionAction::Ignore),
        ] {
            let calls = Rc::clone(&calls);
            let mut action = Some(action);
            parser.register(
                "Log File",
                Box::new(move |section, metadata| {
                    calls.borrow_mut().push(format!("{label}:{section}:{metadata}"));
                    Ok(action.take().unwrap_or(SectionAction::Skip))
                }),
            );
        }
        parser.parse(Cursor::new(input)).unwrap();
        assert_eq!(
            *calls.borrow(),
            vec![
                "first:Log File:# meta line".to_string(),
                "second:Log File:# meta line".to_string(),
            ]
        );
    }

    #[test]
    fn test_handler_error_aborts_parse() {
        let input = "#==[ Log File ]===\n# meta\nbody\n#==[ Log File ]===\n# meta two\nbody two\n";
        let calls: Rc<RefCell<Vec<String>>> = Rc::default();
        let mut parser = Parser::new();
        {
            let calls = Rc::clone(&calls);
            parser.register(
                "Log File",
                Box::new(move |_, metadata| {
                    calls.borrow_mut().push(metadata.to_string());
                    Err(AppError::invalid_data("boom"))
                }),
            );
        }
        let err = parser.parse(Cursor::new(input)).unwrap_err();
        assert!(matches!(err, AppError::InvalidData { .. }));
        // The second occurrence was never reached.
        assert_eq!(*calls.borrow(), vec!["# meta".to_string()]);
    }

    #[test]
    fn test_repeated_section_reinvokes_handlers() {
        let input = "#==[ Log File ]===\n# one\na\n#==[ Log File ]===\n# two\nb\n";
        let buf = SharedBuf::default();
        let metas: Rc<RefCell<Vec<String>>> = Rc::default();
        let mut parser = Parser::new();
        {
            let buf = buf.clone();
            let metas = Rc::clone(&metas);
            parser.register(
                "Log File",
                Box::new(move |_, metadata| {
                    metas.borrow_mut().push(metadata.to_string());
                    Ok(SectionAction::Collect(Box::new(buf.clone())))
                }),
            );
        }
        parser.parse(Cursor::new(input)).unwrap();
        assert_eq!(*metas.borrow(), vec!["# one".to_string(), "# two".to_string()]);
        assert_eq!(buf.contents(), "a\nb\n");
    }

    #[test]
    fn test_malformed_marker_line_is_dropped_from_body() {
        let input = "#==[ Log File ]===\n# meta\nbody\n#==[ broken marker\nstill body\n";
        let buf = SharedBuf::default();
        let mut parser = Parser::new();
        parser.register("Log File", collect_into(&buf));
        parser.parse(Cursor::new(input)).unwrap();
        // Only the malformed marker line vanishes; the section continues.
        assert_eq!(buf.contents(), "body\nstill body\n");
    }

    #[test]
    fn test_sinks_closed_before_next_section_handlers_run() {
        struct EventSink {
            label: &'static str,
            events: Rc<RefCell<Vec<String>>>,
        }

        impl Write for EventSink {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                Ok(buf.len())
            }

            fn flush(&mut self) -> std::io::Result<()> {
                self.events.borrow_mut().push(format!("flush {}", self.label));
                Ok(())
            }
        }

        impl Drop for EventSink {
            fn drop(&mut self) {
                self.events.borrow_mut().push(format!("drop {}", self.label));
            }
        }

        let input = "#==[ A ]===\n# meta a\nbody\n#==[ B ]===\n# meta b\n";
        let events: Rc<RefCell<Vec<String>>> = Rc::default();
        let mut parser = Parser::new();
        {
            let events = Rc::clone(&events);
            parser.register(
                "A",
                Box::new(move |_, _| {
                    Ok(SectionAction::Collect(Box::new(EventSink {
                        label: "a",
                        events: Rc::clone(&events),
                    })))
                }),
            );
        }
        {
            let events = Rc::clone(&events);
            parser.register(
                "B",
                Box::new(move |_, _| {
                    events.borrow_mut().push("handler b".to_string());
                    Ok(SectionAction::Ignore)
                }),
            );
        }
        parser.parse(Cursor::new(input)).unwrap();
        assert_eq!(
            *events.borrow(),
            vec!["flush a".to_string(), "drop a".to_string(), "handler b".to_string()]
        );
    }

    #[test]
    fn test_section_without_handlers_is_consumed_silently() {
        let input = "#==[ Verification ]===\n# meta\nbody\n#==[ Log File ]===\n# meta\nkept\n";
        let buf = SharedBuf::default();
        let mut parser = Parser::new();
        parser.register("Log File", collect_into(&buf));
        parser.parse(Cursor::new(input)).unwrap();
        assert_eq!(buf.contents(), "kept\n");
    }
}
