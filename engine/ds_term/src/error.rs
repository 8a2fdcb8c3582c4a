//! Error type shared by the term and rule model.

use std::fmt;

/// Errors raised by parsing, rendering, and rule indexing.
///
/// Semantic "no such match" outcomes are never errors; `ground`, `rename`,
/// and `matches` report them in-band by returning `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DsError {
    /// Ill-formed canonical text. Line and column are 1-based.
    Parse {
        line: u32,
        col: u32,
        message: String,
    },
    /// A rendering would exceed the active serialisation ceiling.
    ///
    /// Recoverable: widen the ceiling (see [`crate::buffer`]) and retry.
    BufferTooSmall { needed: usize, capacity: usize },
    /// A premise index past the end of a rule.
    IndexOutOfRange { index: usize, len: usize },
}

impl fmt::Display for DsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DsError::Parse { line, col, message } => {
                write!(f, "{line}:{col}: {message}")
            }
            DsError::BufferTooSmall { needed, capacity } => {
                write!(
                    f,
                    "rendering needs {needed} bytes but the buffer ceiling is {capacity}"
                )
            }
            DsError::IndexOutOfRange { index, len } => {
                write!(f, "premise index {index} out of range for rule of length {len}")
            }
        }
    }
}

impl std::error::Error for DsError {}

impl DsError {
    /// True for the parse-error kind.
    pub fn is_parse(&self) -> bool {
        matches!(self, DsError::Parse { .. })
    }

    /// True for the buffer-overflow kind.
    pub fn is_buffer_too_small(&self) -> bool {
        matches!(self, DsError::BufferTooSmall { .. })
    }
}
