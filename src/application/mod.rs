//! Application layer - the section scanner and the splitter built on it.

pub mod formatter;
pub mod inventory;
pub mod scanner;
pub mod splitter;

pub use formatter::{
    format_inventory_json, format_inventory_plain, format_inventory_table, format_report_summary,
    OutputFormat,
};
pub use inventory::scan_inventory;
pub use scanner::{HandlerFn, Parser, SectionAction};
pub use splitter::{skip_prefix_rewrite, PathRewriteFn, Splitter};
