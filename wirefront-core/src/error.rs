//! Error types for wirefront

use std::collections::TryReserveError;
use thiserror::Error;

/// Main error type for wirefront operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Missing argument: {0}")]
    MissingArgument(&'static str),

    #[error("Allocation failure: {0}")]
    Allocation(#[from] TryReserveError),

    #[error("Malformed number at line {line}, column {column}")]
    MalformedNumber { line: usize, column: usize },

    #[error("Parsing canceled at line {line}, column {column}")]
    Canceled { line: usize, column: usize },

    #[error("Cursor belongs to a different sequence")]
    ForeignCursor,

    #[error("Cursor does not denote a live entry")]
    StaleCursor,

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

impl Error {
    /// Whether the error was raised by a token handler asking to stop
    pub fn is_canceled(&self) -> bool {
        matches!(self, Error::Canceled { .. })
    }
}

/// Result type alias for wirefront operations
pub type Result<T> = std::result::Result<T, Error>;
