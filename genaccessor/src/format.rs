//! Canonical formatting of generated units.
//!
//! [`BuiltinFormatter`] re-emits the token stream with tab indentation by
//! bracket depth; [`GofmtFormatter`] pipes the unit through a `gofmt`
//! binary. Both reject output that is not well-formed.

use std::io::{self, Write};
use std::process::{Command, Stdio};

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::syntax::{ParseError, Token, TokenKind, parse_file, tokenize_with_comments};

/// A unit that could not be formatted.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FormatError {
    /// The unit does not lex or parse.
    #[error("generated source is not valid Go: {0}")]
    Syntax(#[from] ParseError),
    /// Brackets do not pair up.
    #[error("{line}:{column}: unbalanced `{found}`")]
    Unbalanced {
        /// Line of the offending token.
        line: u32,
        /// Column of the offending token.
        column: u32,
        /// Stray closing bracket, or the opener that is never closed.
        found: String,
    },
    /// The formatter process could not be run.
    #[error("failed to run {program}: {source}")]
    Spawn {
        /// Program that failed.
        program: Utf8PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// The formatter process rejected the unit.
    #[error("{program} exited with status {status:?}: {stderr}")]
    Rejected {
        /// Program that failed.
        program: Utf8PathBuf,
        /// Exit code, if any.
        status: Option<i32>,
        /// Captured standard error.
        stderr: String,
    },
    /// The formatter process wrote invalid UTF-8.
    #[error("{program} produced invalid UTF-8")]
    InvalidOutput {
        /// Program that failed.
        program: Utf8PathBuf,
    },
}

/// Normalizes the text of a generated unit.
pub trait SourceFormatter {
    /// Formats `source`.
    ///
    /// # Errors
    ///
    /// Returns a [`FormatError`] when `source` is not well-formed Go or the
    /// formatter itself fails.
    fn format(&self, source: &str) -> Result<String, FormatError>;
}

impl<F: SourceFormatter + ?Sized> SourceFormatter for Box<F> {
    fn format(&self, source: &str) -> Result<String, FormatError> {
        (**self).format(source)
    }
}

/// Which formatter generated units pass through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatterKind {
    /// [`BuiltinFormatter`].
    #[default]
    Builtin,
    /// [`GofmtFormatter`].
    Gofmt,
}

impl FormatterKind {
    /// Instantiates the formatter. `gofmt_bin` overrides the `gofmt`
    /// program looked up on `PATH`.
    #[must_use]
    pub fn build(self, gofmt_bin: Option<&Utf8Path>) -> Box<dyn SourceFormatter> {
        match self {
            Self::Builtin => Box::new(BuiltinFormatter),
            Self::Gofmt => Box::new(
                gofmt_bin.map_or_else(GofmtFormatter::default, GofmtFormatter::new),
            ),
        }
    }
}

/// Token-based formatter needing no Go toolchain.
///
/// Line structure is kept as written. Each line is indented with one tab
/// per open bracket, runs of blanks inside a line collapse to one space and
/// consecutive blank lines collapse to one.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinFormatter;

fn opener_for(closer: &str) -> Option<&'static str> {
    match closer {
        ")" => Some("("),
        "]" => Some("["),
        "}" => Some("{"),
        _ => None,
    }
}

impl BuiltinFormatter {
    fn emit(tokens: &[Token]) -> Result<String, FormatError> {
        let mut out = String::new();
        let mut open: Vec<&Token> = Vec::new();
        let mut prev_end: Option<u32> = None;
        let mut line_empty = true;

        for token in tokens {
            match token.kind {
                TokenKind::Eof => {
                    if let Some(unclosed) = open.last() {
                        return Err(FormatError::Unbalanced {
                            line: unclosed.line,
                            column: unclosed.column,
                            found: unclosed.text.clone(),
                        });
                    }
                    break;
                }
                TokenKind::Semicolon if token.is_implicit_semicolon() => continue,
                _ => {}
            }

            let closes = token.kind == TokenKind::Punct && opener_for(&token.text).is_some();
            if closes {
                let expected = opener_for(&token.text);
                match open.pop() {
                    Some(opener) if Some(opener.text.as_str()) == expected => {}
                    _ => {
                        return Err(FormatError::Unbalanced {
                            line: token.line,
                            column: token.column,
                            found: token.text.clone(),
                        });
                    }
                }
            }

            let new_line = prev_end.is_none_or(|end| token.line > end);
            if new_line {
                if prev_end.is_some() {
                    out.push('\n');
                    if prev_end.is_some_and(|end| token.line > end + 1) {
                        out.push('\n');
                    }
                }
                for _ in 0..open.len() {
                    out.push('\t');
                }
                line_empty = true;
            }
            if !line_empty && token.space_before {
                out.push(' ');
            }
            out.push_str(&token.text);
            line_empty = false;

            if token.kind == TokenKind::Punct && matches!(token.text.as_str(), "(" | "[" | "{") {
                open.push(token);
            }
            prev_end = Some(token.end_line());
        }
        out.push('\n');
        Ok(out)
    }
}

impl SourceFormatter for BuiltinFormatter {
    fn format(&self, source: &str) -> Result<String, FormatError> {
        let tokens = tokenize_with_comments(source)?;
        let formatted = Self::emit(&tokens)?;
        parse_file(&formatted)?;
        Ok(formatted)
    }
}

/// Formatter running an external `gofmt`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GofmtFormatter {
    program: Utf8PathBuf,
}

impl GofmtFormatter {
    /// Uses `program` as the `gofmt` binary.
    #[must_use]
    pub fn new(program: &Utf8Path) -> Self {
        Self {
            program: program.to_path_buf(),
        }
    }
}

impl Default for GofmtFormatter {
    fn default() -> Self {
        Self {
            program: Utf8PathBuf::from("gofmt"),
        }
    }
}

impl SourceFormatter for GofmtFormatter {
    fn format(&self, source: &str) -> Result<String, FormatError> {
        let spawn_error = |source| FormatError::Spawn {
            program: self.program.clone(),
            source,
        };
        let mut child = Command::new(self.program.as_std_path())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_error)?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(source.as_bytes()).map_err(spawn_error)?;
        }
        let output = child.wait_with_output().map_err(spawn_error)?;
        if !output.status.success() {
            return Err(FormatError::Rejected {
                program: self.program.clone(),
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }
        String::from_utf8(output.stdout).map_err(|_| FormatError::InvalidOutput {
            program: self.program.clone(),
        })
    }
}
