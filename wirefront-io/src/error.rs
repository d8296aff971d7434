//! Recoverable parse diagnostics
//!
//! Fatal failures are reported through [`wirefront_core::Error`]. The problems
//! described here only cost the offending line: the record is dropped, a
//! diagnostic is logged and kept in the load report, and parsing goes on.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// OBJ command currently being accumulated by the parser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Looking for a command keyword
    None,
    /// Ignoring everything until the line ends
    Wait,
    /// `v` line
    Vertex,
    /// `f` line
    Face,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Command::None => "none",
            Command::Wait => "wait",
            Command::Vertex => "vertex",
            Command::Face => "face",
        };
        f.write_str(name)
    }
}

/// What went wrong on a line
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticKind {
    #[error("unknown command `{0}` skipped")]
    UnknownCommand(String),

    #[error("unexpected text `{0}` inside a command")]
    UnexpectedText(String),

    #[error("{command} has {found} numeric fields")]
    FieldCountMismatch { command: Command, found: usize },

    #[error("face index `{0}` does not name a defined vertex")]
    IndexOutOfRange(String),

    #[error("number `{0}` could not be read")]
    InvalidNumber(String),
}

/// A recoverable problem found on one line of input
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("line {line}: {kind}")]
pub struct Diagnostic {
    pub line: usize,
    pub kind: DiagnosticKind,
}
