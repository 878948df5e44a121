//! Error handling for scrollback
//!
//! This module defines the error types used throughout the crate. Appending,
//! clearing and searching never fail; errors only come out of persistence,
//! configuration and the database backend.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for scrollback operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for scrollback operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO operation failed
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Database operation failed
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A history line exceeded the maximum line length before its terminator
    #[error("line {line} is too long")]
    LineTooLong { line: usize },

    /// A history line is not valid UTF-8
    #[error("invalid string at line {line}")]
    InvalidEncoding { line: usize },

    /// A restore or persist stopped early after processing `count` lines
    #[error("{source} (after {count} lines)")]
    Interrupted {
        count: usize,
        #[source]
        source: Box<Error>,
    },

    /// History file not found
    #[error("History file not found: {path}")]
    HistoryFileNotFound { path: PathBuf },

    /// Home directory could not be determined
    #[error("Home directory not found")]
    HomeDirectoryNotFound,

    /// Invalid command line arguments
    #[error("Invalid arguments: {message}")]
    InvalidArguments { message: String },

    /// Configuration validation failed
    #[error("Configuration validation failed: {field} - {reason}")]
    ConfigValidation { field: String, reason: String },

    /// Generic error with custom message
    #[error("{message}")]
    Custom { message: String },
}

impl Error {
    /// Create a custom error with a message
    pub fn custom<S: Into<String>>(message: S) -> Self {
        Error::Custom {
            message: message.into(),
        }
    }

    /// Create an invalid arguments error
    pub fn invalid_arguments<S: Into<String>>(message: S) -> Self {
        Error::InvalidArguments {
            message: message.into(),
        }
    }

    /// Create a config validation error
    pub fn config_validation<S: Into<String>>(field: S, reason: S) -> Self {
        Error::ConfigValidation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Wrap an error with the number of lines processed before it occurred
    pub fn interrupted(count: usize, source: Error) -> Self {
        Error::Interrupted {
            count,
            source: Box::new(source),
        }
    }

    /// Number of lines a restore or persist processed before failing
    pub fn processed(&self) -> Option<usize> {
        match self {
            Error::Interrupted { count, .. } => Some(*count),
            _ => None,
        }
    }

    /// The underlying error, looking through `Interrupted`
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::Interrupted { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Check if this error is recoverable
    ///
    /// A failed restore leaves the lines read so far in the store, so the
    /// session can continue with a partially loaded history.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::Interrupted { .. } => true,
            Error::LineTooLong { .. } | Error::InvalidEncoding { .. } => true,
            Error::Io(_) => true,
            Error::HistoryFileNotFound { .. } => true,
            Error::InvalidArguments { .. } => false,
            Error::HomeDirectoryNotFound => false,
            Error::ConfigValidation { .. } => false,
            _ => true,
        }
    }

    /// Get the error category for logging purposes
    pub fn category(&self) -> &'static str {
        match self {
            Error::Io(_) => "io",
            Error::Json(_) => "json",
            Error::Database(_) => "database",
            Error::LineTooLong { .. } | Error::InvalidEncoding { .. } => "codec",
            Error::Interrupted { source, .. } => source.category(),
            Error::HistoryFileNotFound { .. } => "history",
            Error::HomeDirectoryNotFound => "system",
            Error::InvalidArguments { .. } => "arguments",
            Error::ConfigValidation { .. } => "config",
            Error::Custom { .. } => "custom",
        }
    }
}
