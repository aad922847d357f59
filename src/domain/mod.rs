//! Domain layer - core types shared across the crate.
//!
//! This layer contains pure models and error types without any external
//! dependencies (filesystem, terminal, etc.).

pub mod error;
pub mod models;

pub use error::{AppError, Result};
pub use models::{
    ArchiveEntry, SectionKind, SplitReport, WrittenFile, SECTION_CONFIGURATION_FILE,
    SECTION_LOG_FILE,
};
