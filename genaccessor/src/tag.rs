//! Struct tag interpretation and method naming.

use thiserror::Error;

use crate::syntax::{is_identifier, unquote};
use crate::vocabulary::TagRule;

/// Lower-case initialisms that are upper-cased as a whole when they open a
/// field name.
pub const INITIALISMS: [&str; 38] = [
    "acl", "api", "ascii", "cpu", "css", "dns", "eof", "guid", "html", "http", "https", "id", "ip",
    "json", "lhs", "qps", "ram", "rhs", "rpc", "sla", "smtp", "sql", "ssh", "tcp", "tls", "ttl",
    "udp", "ui", "uid", "uuid", "uri", "url", "utf8", "vm", "xml", "xmpp", "xsrf", "xss",
];

/// A tag value that does not name valid methods.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum TagError {
    /// `key:"a,,b"` or `key:" , "`.
    #[error("tag `{key}` contains an empty method name")]
    EmptyName {
        /// Offending tag key.
        key: String,
    },
    /// A listed name is not a Go identifier.
    #[error("tag `{key}` names `{name}`, which is not a valid Go identifier")]
    InvalidName {
        /// Offending tag key.
        key: String,
        /// Name as written.
        name: String,
    },
}

/// Looks up `key` in a struct tag the way `reflect.StructTag.Lookup` does.
///
/// The tag is a space-separated list of `key:"value"` pairs. Scanning stops
/// at the first malformed pair, so keys after it are never found.
///
/// # Examples
///
/// ```
/// use genaccessor::tag::lookup;
///
/// let tag = r#"json:"name,omitempty" getter:"""#;
/// assert_eq!(lookup(tag, "getter").as_deref(), Some(""));
/// assert_eq!(lookup(tag, "setter"), None);
/// ```
#[must_use]
pub fn lookup(tag: &str, key: &str) -> Option<String> {
    let bytes = tag.as_bytes();
    let mut pos = 0;
    while pos < bytes.len() {
        while bytes.get(pos) == Some(&b' ') {
            pos += 1;
        }
        if pos >= bytes.len() {
            break;
        }

        let name_start = pos;
        while bytes
            .get(pos)
            .is_some_and(|&b| b > b' ' && b != b':' && b != b'"' && b != 0x7f)
        {
            pos += 1;
        }
        if pos == name_start || bytes.get(pos) != Some(&b':') || bytes.get(pos + 1) != Some(&b'"')
        {
            break;
        }
        let name = tag.get(name_start..pos)?;
        pos += 1;

        let value_start = pos;
        pos += 1;
        while let Some(&b) = bytes.get(pos) {
            if b == b'"' {
                break;
            }
            if b == b'\\' {
                pos += 1;
            }
            pos += 1;
        }
        if pos >= bytes.len() {
            break;
        }
        let quoted = tag.get(value_start..=pos)?;
        pos += 1;

        if name == key {
            return unquote(quoted).ok();
        }
    }
    None
}

/// Converts a field name to upper camel case.
///
/// The leading run of lower-case letters is upper-cased entirely when it is
/// one of [`INITIALISMS`]; otherwise only the first character changes.
///
/// # Examples
///
/// ```
/// use genaccessor::tag::upper_camel;
///
/// assert_eq!(upper_camel("name"), "Name");
/// assert_eq!(upper_camel("urlPath"), "URLPath");
/// assert_eq!(upper_camel("identity"), "Identity");
/// ```
#[must_use]
pub fn upper_camel(name: &str) -> String {
    let run_len: usize = name
        .chars()
        .take_while(|c| c.is_lowercase())
        .map(char::len_utf8)
        .sum();
    let (run, rest) = name.split_at(run_len);
    if INITIALISMS.contains(&run) {
        return format!("{}{rest}", run.to_uppercase());
    }
    let mut chars = name.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Method names requested for `field_name` by `rule` in `tag`.
///
/// Returns `Ok(None)` when the rule's key is absent. An empty value yields
/// the rule's default name; otherwise the value is split on `,` and each
/// trimmed segment must be a Go identifier.
///
/// # Errors
///
/// Returns a [`TagError`] for empty segments and invalid identifiers.
pub fn requested_methods(
    tag: &str,
    rule: &TagRule,
    field_name: &str,
) -> Result<Option<Vec<String>>, TagError> {
    let Some(value) = lookup(tag, &rule.key) else {
        return Ok(None);
    };
    if value.is_empty() {
        return Ok(Some(vec![rule.default_method_name(field_name)]));
    }
    value
        .split(',')
        .map(str::trim)
        .map(|name| {
            if name.is_empty() {
                Err(TagError::EmptyName {
                    key: rule.key.clone(),
                })
            } else if is_identifier(name) {
                Ok(name.to_owned())
            } else {
                Err(TagError::InvalidName {
                    key: rule.key.clone(),
                    name: name.to_owned(),
                })
            }
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}
