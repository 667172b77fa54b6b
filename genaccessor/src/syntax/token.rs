//! Tokens produced by the Go lexer.

/// Coarse token classes. Punctuation and keywords carry their spelling in
/// [`Token::text`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Identifier, including the blank identifier `_`.
    Ident,
    /// Reserved word such as `struct` or `func`.
    Keyword,
    /// Integer, floating-point or imaginary literal.
    Number,
    /// Rune literal such as `'a'`.
    Rune,
    /// Interpreted string literal, quotes included.
    String,
    /// Raw string literal, backquotes included.
    RawString,
    /// Line or general comment. Only emitted when comments are kept.
    Comment,
    /// Operator or delimiter.
    Punct,
    /// Statement terminator, either written or inserted at a line break.
    Semicolon,
    /// End of input.
    Eof,
}

/// A lexed token with its source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Token class.
    pub kind: TokenKind,
    /// Source spelling. Inserted semicolons use `"\n"`.
    pub text: String,
    /// One-based line of the first character.
    pub line: u32,
    /// One-based column (in characters) of the first character.
    pub column: u32,
    /// Whether whitespace separated this token from the previous one.
    pub space_before: bool,
}

impl Token {
    /// Returns `true` for a punctuation token spelled `text`.
    #[must_use]
    pub fn is_punct(&self, text: &str) -> bool {
        self.kind == TokenKind::Punct && self.text == text
    }

    /// Returns `true` for the keyword `word`.
    #[must_use]
    pub fn is_keyword(&self, word: &str) -> bool {
        self.kind == TokenKind::Keyword && self.text == word
    }

    /// Returns `true` for a string literal of either flavour.
    #[must_use]
    pub const fn is_string(&self) -> bool {
        matches!(self.kind, TokenKind::String | TokenKind::RawString)
    }

    /// Returns `true` for a semicolon the lexer inserted at a line break.
    #[must_use]
    pub fn is_implicit_semicolon(&self) -> bool {
        self.kind == TokenKind::Semicolon && self.text == "\n"
    }

    /// Line on which the token ends; differs from [`Token::line`] for raw
    /// strings and general comments spanning several lines.
    #[must_use]
    pub fn end_line(&self) -> u32 {
        if self.is_implicit_semicolon() {
            return self.line;
        }
        let breaks = self.text.matches('\n').count();
        self.line
            .saturating_add(u32::try_from(breaks).unwrap_or(u32::MAX))
    }
}

/// Go's reserved words.
pub const KEYWORDS: [&str; 25] = [
    "break",
    "case",
    "chan",
    "const",
    "continue",
    "default",
    "defer",
    "else",
    "fallthrough",
    "for",
    "func",
    "go",
    "goto",
    "if",
    "import",
    "interface",
    "map",
    "package",
    "range",
    "return",
    "select",
    "struct",
    "switch",
    "type",
    "var",
];

/// Returns `true` when `word` is a Go keyword.
#[must_use]
pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

/// Returns `true` when `name` is a valid, non-keyword Go identifier.
#[must_use]
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first == '_' || first.is_alphabetic())
        && chars.all(|ch| ch == '_' || ch.is_alphanumeric())
        && !is_keyword(name)
}

/// Returns `true` when `name` is exported, i.e. starts with an upper-case
/// letter.
#[must_use]
pub fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}
