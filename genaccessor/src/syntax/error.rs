//! Syntax errors reported by the lexer and parser.

use thiserror::Error;

/// A syntax error with a one-based source position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{line}:{column}: {message}")]
pub struct ParseError {
    /// Line of the offending token.
    pub line: u32,
    /// Column of the offending token.
    pub column: u32,
    /// Human-readable description.
    pub message: String,
}

impl ParseError {
    /// Builds an error at `line`:`column`.
    pub fn new(line: u32, column: u32, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            message: message.into(),
        }
    }
}
