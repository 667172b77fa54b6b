//! Inline fixture text helpers.

/// Removes the indentation common to every non-blank line and a leading
/// line break, so Go fixtures can be written indented inside tests.
///
/// # Examples
///
/// ```
/// use genaccessor_test_helpers::text::dedent;
///
/// let source = dedent(
///     "
///     package models
///
///     type User struct{}
///     ",
/// );
/// assert_eq!(source, "package models\n\ntype User struct{}\n");
/// ```
#[must_use]
pub fn dedent(text: &str) -> String {
    let body = text.strip_prefix('\n').unwrap_or(text);
    let indent = body
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start_matches([' ', '\t']).len())
        .min()
        .unwrap_or(0);
    let mut out = String::with_capacity(body.len());
    for line in body.lines() {
        out.push_str(line.get(indent..).unwrap_or_else(|| line.trim_start()));
        out.push('\n');
    }
    while out.ends_with("\n\n") {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::dedent;

    #[test]
    fn strips_common_indentation() {
        assert_eq!(dedent("\n    a\n      b\n    c\n"), "a\n  b\nc\n");
    }

    #[test]
    fn keeps_blank_lines_inside() {
        assert_eq!(dedent("\n  a\n\n  b\n  "), "a\n\nb\n");
    }

    #[test]
    fn leaves_unindented_text_alone() {
        assert_eq!(dedent("package x\n"), "package x\n");
    }
}
