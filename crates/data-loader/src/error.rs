//! Error types for the data-loader crate.
//!
//! Every failure a rating store can report flows through [`DataLoadError`].
//! Parsing errors carry the file name and line number so a bad record in a
//! million-line ratings file can be found quickly.

use thiserror::Error;

/// Errors that can occur while loading, validating or querying ratings
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Line in a ratings file couldn't be parsed
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },

    /// A data field had an invalid value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// Expected number of fields in a line doesn't match actual
    #[error("Expected {expected} fields but found {found} in line {line}")]
    FieldCountMismatch {
        expected: usize,
        found: usize,
        line: usize,
    },

    /// The file extension doesn't map to a known ratings layout
    #[error("Unsupported ratings format: {path}")]
    UnsupportedFormat { path: String },

    /// The backing store could not answer a query
    #[error("Rating store unavailable: {0}")]
    StoreUnavailable(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;
