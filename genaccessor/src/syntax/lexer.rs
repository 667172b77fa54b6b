//! Go lexer with automatic semicolon insertion.

use super::error::ParseError;
use super::token::{Token, TokenKind, is_keyword};

const PUNCT3: [&str; 4] = ["<<=", ">>=", "&^=", "..."];
const PUNCT2: [&str; 21] = [
    "&&", "||", "<-", "++", "--", "==", "!=", "<=", ">=", ":=", "+=", "-=", "*=", "/=", "%=",
    "&=", "|=", "^=", "<<", ">>", "&^",
];
const PUNCT1: &str = "+-*/%&|^<>=!()[]{},;.:~";

/// Splits `source` into tokens, dropping comments.
///
/// # Errors
///
/// Returns a [`ParseError`] for unterminated literals or comments and for
/// characters that cannot start a token.
pub fn tokenize(source: &str) -> Result<Vec<Token>, ParseError> {
    Lexer::new(source, false).run()
}

/// Splits `source` into tokens, keeping comments as [`TokenKind::Comment`].
///
/// # Errors
///
/// Same conditions as [`tokenize`].
pub fn tokenize_with_comments(source: &str) -> Result<Vec<Token>, ParseError> {
    Lexer::new(source, true).run()
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: u32,
    column: u32,
    keep_comments: bool,
    insert_semi: bool,
    tokens: Vec<Token>,
}

impl Lexer {
    fn new(source: &str, keep_comments: bool) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            keep_comments,
            insert_semi: false,
            tokens: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Vec<Token>, ParseError> {
        let mut space_before = false;
        while let Some(ch) = self.peek(0) {
            match ch {
                '\n' => {
                    self.terminate_line();
                    self.bump();
                    space_before = true;
                }
                ' ' | '\t' | '\r' | '\u{feff}' => {
                    self.bump();
                    space_before = true;
                }
                '/' if self.peek(1) == Some('/') => {
                    self.line_comment(space_before);
                    space_before = true;
                }
                '/' if self.peek(1) == Some('*') => {
                    self.general_comment(space_before)?;
                    space_before = true;
                }
                _ => {
                    self.token(space_before)?;
                    space_before = false;
                }
            }
        }
        self.terminate_line();
        let (line, column) = (self.line, self.column);
        self.tokens.push(Token {
            kind: TokenKind::Eof,
            text: String::new(),
            line,
            column,
            space_before,
        });
        Ok(self.tokens)
    }

    fn peek(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek(0)?;
        self.pos += 1;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(self.line, self.column, message)
    }

    fn terminate_line(&mut self) {
        if !self.insert_semi {
            return;
        }
        self.insert_semi = false;
        self.tokens.push(Token {
            kind: TokenKind::Semicolon,
            text: "\n".to_owned(),
            line: self.line,
            column: self.column,
            space_before: false,
        });
    }

    fn text_since(&self, start: usize) -> String {
        self.chars
            .get(start..self.pos)
            .map(|chars| chars.iter().collect())
            .unwrap_or_default()
    }

    fn line_comment(&mut self, space_before: bool) {
        let (start, line, column) = (self.pos, self.line, self.column);
        while self.peek(0).is_some_and(|ch| ch != '\n') {
            self.bump();
        }
        if self.keep_comments {
            let text = self.text_since(start);
            let text = text.trim_end_matches('\r').to_owned();
            self.push(TokenKind::Comment, text, line, column, space_before);
        }
    }

    fn general_comment(&mut self, space_before: bool) -> Result<(), ParseError> {
        let (start, line, column) = (self.pos, self.line, self.column);
        self.bump();
        self.bump();
        loop {
            match self.bump() {
                Some('*') if self.peek(0) == Some('/') => {
                    self.bump();
                    break;
                }
                Some(_) => {}
                None => return Err(ParseError::new(line, column, "comment not terminated")),
            }
        }
        let text = self.text_since(start);
        let spans_lines = text.contains('\n');
        if self.keep_comments {
            self.push(TokenKind::Comment, text, line, column, space_before);
        }
        if spans_lines {
            self.terminate_line();
        }
        Ok(())
    }

    fn push(&mut self, kind: TokenKind, text: String, line: u32, column: u32, space_before: bool) {
        self.tokens.push(Token {
            kind,
            text,
            line,
            column,
            space_before,
        });
    }

    fn token(&mut self, space_before: bool) -> Result<(), ParseError> {
        let (start, line, column) = (self.pos, self.line, self.column);
        let Some(ch) = self.peek(0) else {
            return Ok(());
        };
        let kind = if ch == '_' || ch.is_alphabetic() {
            while self
                .peek(0)
                .is_some_and(|next| next == '_' || next.is_alphanumeric())
            {
                self.bump();
            }
            TokenKind::Ident
        } else if ch.is_ascii_digit()
            || (ch == '.' && self.peek(1).is_some_and(|d| d.is_ascii_digit()))
        {
            self.number();
            TokenKind::Number
        } else if ch == '\'' {
            self.quoted('\'', "rune literal not terminated")?;
            TokenKind::Rune
        } else if ch == '"' {
            self.quoted('"', "string literal not terminated")?;
            TokenKind::String
        } else if ch == '`' {
            self.raw_string()?;
            TokenKind::RawString
        } else {
            self.punct()?;
            TokenKind::Punct
        };

        let mut text = self.text_since(start);
        let kind = match kind {
            TokenKind::Ident if is_keyword(&text) => TokenKind::Keyword,
            TokenKind::Punct if text == ";" => TokenKind::Semicolon,
            TokenKind::RawString => {
                text.retain(|c| c != '\r');
                kind
            }
            other => other,
        };
        self.insert_semi = match kind {
            TokenKind::Ident
            | TokenKind::Number
            | TokenKind::Rune
            | TokenKind::String
            | TokenKind::RawString => true,
            TokenKind::Keyword => matches!(
                text.as_str(),
                "break" | "continue" | "fallthrough" | "return"
            ),
            TokenKind::Punct => matches!(text.as_str(), ")" | "]" | "}" | "++" | "--"),
            _ => false,
        };
        self.push(kind, text, line, column, space_before);
        Ok(())
    }

    fn number(&mut self) {
        let hex = self.peek(0) == Some('0') && matches!(self.peek(1), Some('x' | 'X'));
        while let Some(ch) = self.peek(0) {
            if !(ch.is_ascii_alphanumeric() || ch == '_' || ch == '.') {
                break;
            }
            let exponent = if hex {
                matches!(ch, 'p' | 'P')
            } else {
                matches!(ch, 'e' | 'E')
            };
            self.bump();
            if exponent && matches!(self.peek(0), Some('+' | '-')) {
                self.bump();
            }
        }
    }

    fn quoted(&mut self, quote: char, unterminated: &str) -> Result<(), ParseError> {
        self.bump();
        loop {
            match self.peek(0) {
                None | Some('\n') => return Err(self.error(unterminated)),
                Some('\\') => {
                    self.bump();
                    if self.peek(0).is_none() {
                        return Err(self.error(unterminated));
                    }
                    self.bump();
                }
                Some(ch) => {
                    self.bump();
                    if ch == quote {
                        return Ok(());
                    }
                }
            }
        }
    }

    fn raw_string(&mut self) -> Result<(), ParseError> {
        let (line, column) = (self.line, self.column);
        self.bump();
        loop {
            match self.bump() {
                Some('`') => return Ok(()),
                Some(_) => {}
                None => {
                    return Err(ParseError::new(
                        line,
                        column,
                        "raw string literal not terminated",
                    ));
                }
            }
        }
    }

    fn punct(&mut self) -> Result<(), ParseError> {
        let lookahead: String = (0..3).filter_map(|i| self.peek(i)).collect();
        let width = if PUNCT3.iter().any(|p| lookahead.starts_with(p)) {
            3
        } else if PUNCT2.iter().any(|p| lookahead.starts_with(p)) {
            2
        } else if lookahead.chars().next().is_some_and(|c| PUNCT1.contains(c)) {
            1
        } else {
            let found = lookahead.chars().next().unwrap_or(' ');
            return Err(self.error(format!("invalid character {found:?}")));
        };
        for _ in 0..width {
            self.bump();
        }
        Ok(())
    }
}
