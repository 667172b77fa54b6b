//! Decoding of Go string literals.

use thiserror::Error;

/// Failure to decode a string literal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum UnquoteError {
    /// The text is not wrapped in matching `"` or `` ` `` delimiters.
    #[error("not a quoted string: {0}")]
    NotQuoted(String),
    /// An escape sequence is malformed or unknown.
    #[error("invalid escape sequence `\\{0}`")]
    InvalidEscape(String),
    /// The decoded bytes are not UTF-8.
    #[error("string literal is not valid UTF-8")]
    InvalidUtf8,
}

/// Decodes an interpreted (`"..."`) or raw (`` `...` ``) string literal.
///
/// # Errors
///
/// Returns an [`UnquoteError`] when the delimiters are missing, an escape is
/// invalid or the decoded bytes are not UTF-8.
///
/// # Examples
///
/// ```
/// use genaccessor::syntax::unquote;
///
/// assert_eq!(unquote(r#""a\tb""#).as_deref(), Ok("a\tb"));
/// assert_eq!(unquote("`raw\\n`").as_deref(), Ok("raw\\n"));
/// ```
pub fn unquote(literal: &str) -> Result<String, UnquoteError> {
    if let Some(body) = literal
        .strip_prefix('`')
        .and_then(|rest| rest.strip_suffix('`'))
    {
        if body.contains('`') {
            return Err(UnquoteError::NotQuoted(literal.to_owned()));
        }
        return Ok(body.replace('\r', ""));
    }
    let body = literal
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .ok_or_else(|| UnquoteError::NotQuoted(literal.to_owned()))?;
    if !body.contains('\\') {
        if body.contains('"') || body.contains('\n') {
            return Err(UnquoteError::NotQuoted(literal.to_owned()));
        }
        return Ok(body.to_owned());
    }

    let mut out = Vec::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '"' | '\n' => return Err(UnquoteError::NotQuoted(literal.to_owned())),
            '\\' => decode_escape(&mut chars, &mut out)?,
            other => {
                let mut buf = [0_u8; 4];
                out.extend_from_slice(other.encode_utf8(&mut buf).as_bytes());
            }
        }
    }
    String::from_utf8(out).map_err(|_| UnquoteError::InvalidUtf8)
}

fn decode_escape(chars: &mut std::str::Chars<'_>, out: &mut Vec<u8>) -> Result<(), UnquoteError> {
    let Some(kind) = chars.next() else {
        return Err(UnquoteError::InvalidEscape(String::new()));
    };
    let simple = match kind {
        'a' => Some(0x07),
        'b' => Some(0x08),
        'f' => Some(0x0c),
        'n' => Some(b'\n'),
        'r' => Some(b'\r'),
        't' => Some(b'\t'),
        'v' => Some(0x0b),
        '\\' => Some(b'\\'),
        '"' => Some(b'"'),
        _ => None,
    };
    if let Some(byte) = simple {
        out.push(byte);
        return Ok(());
    }
    match kind {
        'x' => {
            let digits = take(chars, 2);
            let byte = u8::from_str_radix(&digits, 16)
                .ok()
                .filter(|_| digits.len() == 2)
                .ok_or_else(|| UnquoteError::InvalidEscape(format!("x{digits}")))?;
            out.push(byte);
        }
        '0'..='7' => {
            let digits = format!("{kind}{}", take(chars, 2));
            let byte = u8::from_str_radix(&digits, 8)
                .ok()
                .filter(|_| digits.len() == 3)
                .ok_or_else(|| UnquoteError::InvalidEscape(digits.clone()))?;
            out.push(byte);
        }
        'u' | 'U' => {
            let width = if kind == 'u' { 4 } else { 8 };
            let digits = take(chars, width);
            let ch = u32::from_str_radix(&digits, 16)
                .ok()
                .filter(|_| digits.len() == width)
                .and_then(char::from_u32)
                .ok_or_else(|| UnquoteError::InvalidEscape(format!("{kind}{digits}")))?;
            let mut buf = [0_u8; 4];
            out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
        }
        other => return Err(UnquoteError::InvalidEscape(other.to_string())),
    }
    Ok(())
}

fn take(chars: &mut std::str::Chars<'_>, count: usize) -> String {
    chars.by_ref().take(count).collect()
}

#[cfg(test)]
mod tests {
    //! Unit tests for string literal decoding.

    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(r#""plain""#, "plain")]
    #[case(r#""tab\there""#, "tab\there")]
    #[case(r#""quote\"d""#, "quote\"d")]
    #[case(r#""\x41\102é\U0001F600""#, "AB\u{e9}\u{1F600}")]
    #[case("`a\\b`", "a\\b")]
    #[case(r#""""#, "")]
    fn decodes_literals(#[case] literal: &str, #[case] expected: &str) {
        assert_eq!(unquote(literal).expect("unquote"), expected);
    }

    #[rstest]
    #[case("plain")]
    #[case("\"")]
    #[case("\"a\"b\"")]
    #[case("`a`b`")]
    fn rejects_unquoted_text(#[case] literal: &str) {
        assert!(matches!(
            unquote(literal),
            Err(UnquoteError::NotQuoted(_))
        ));
    }

    #[rstest]
    #[case(r#""\q""#)]
    #[case(r#""\x4""#)]
    #[case(r#""\400""#)]
    #[case(r#""\uD800""#)]
    fn rejects_bad_escapes(#[case] literal: &str) {
        assert!(matches!(
            unquote(literal),
            Err(UnquoteError::InvalidEscape(_))
        ));
    }

    #[rstest]
    fn rejects_invalid_utf8() {
        assert_eq!(unquote(r#""\xff""#), Err(UnquoteError::InvalidUtf8));
    }
}
