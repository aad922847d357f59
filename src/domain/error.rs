//! Domain-level error types for scsplit.
//!
//! All errors are typed with `thiserror` and provide meaningful context
//! without exposing internal details to end users.
//!
//! "Skip this section" is deliberately NOT an error variant; it is a value of
//! [`crate::application::SectionAction`], so it can never leak out of a parse
//! as a failure.

use thiserror::Error;

/// Application-level errors.
#[derive(Error, Debug)]
pub enum AppError {
    /// IO operation failed (stream read, file or directory creation, write).
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Invalid or unexpected data in the archive stream.
    #[error("Invalid data: {message}")]
    InvalidData { message: String },

    /// Configuration or environment error.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// The caller-supplied path rewrite callback rejected a path.
    #[error("Path rewrite failed: {message}")]
    Rewrite { message: String },
}

impl AppError {
    /// Create an IO error with context.
    pub fn io(message: impl Into<String>, err: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(err),
        }
    }

    /// Create an invalid data error.
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// Create a rewrite error.
    pub fn rewrite(message: impl Into<String>) -> Self {
        Self::Rewrite {
            message: message.into(),
        }
    }
}

/// Result type alias using `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
