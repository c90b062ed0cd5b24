//! Error types for marshaling, parsing and detection
//!
//! Every failure carries enough context (1-based line number, offending token) to render
//! an actionable message. Positions are `None` when an error is raised on the marshal side,
//! where there is no input text to point into.

use thiserror::Error;

/// Errors that can occur while converting between notebooks and text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// Format id not found in the registry
    #[error("Format '{0}' not found")]
    FormatNotFound(String),

    /// Language id not found in the language table
    #[error("Unknown language '{0}'")]
    UnknownLanguage(String),

    /// A cell type the chosen format cannot encode, or an unrecognised type token
    #[error("Unsupported cell type '{token}'{}", at_line(.line))]
    UnsupportedCellType { line: Option<usize>, token: String },

    /// Document or cell metadata is missing or malformed
    #[error("Invalid metadata{}: {message}", at_line(.line))]
    InvalidMetadata {
        line: Option<usize>,
        message: String,
    },

    /// The header block is malformed or incomplete
    #[error("Header parse error at line {line}: {message}")]
    HeaderParseError { line: usize, message: String },

    /// A line cannot be assigned to a cell without guessing
    #[error("Ambiguous cell boundary{}: {reason} ('{token}')", at_line(.line))]
    AmbiguousCellBoundary {
        line: Option<usize>,
        token: String,
        reason: String,
    },

    /// More than one explicit-marker format matches the text
    #[error("Ambiguous format, candidates: {}", .candidates.join(", "))]
    AmbiguousFormat { candidates: Vec<String> },
}

fn at_line(line: &Option<usize>) -> String {
    match line {
        Some(line) => format!(" at line {line}"),
        None => String::new(),
    }
}

impl FormatError {
    pub(crate) fn metadata(message: impl Into<String>) -> Self {
        FormatError::InvalidMetadata {
            line: None,
            message: message.into(),
        }
    }

    pub(crate) fn header(line: usize, message: impl Into<String>) -> Self {
        FormatError::HeaderParseError {
            line,
            message: message.into(),
        }
    }

    pub(crate) fn boundary(
        line: Option<usize>,
        token: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        FormatError::AmbiguousCellBoundary {
            line,
            token: token.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FormatError>;
