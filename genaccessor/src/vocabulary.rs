//! The table of recognised tag keys and the methods they generate.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tag::upper_camel;

const GETTER_TEMPLATE: &str = "\
func (m {{ receiver }}) {{ method_name }}() {{ field_type }} {
\treturn m.{{ field_name }}
}
";

const SETTER_TEMPLATE: &str = "\
func (m *{{ receiver }}) {{ method_name }}(s {{ field_type }}) {
\tm.{{ field_name }} = s
}
";

/// Kind of accessor a tag requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MethodKind {
    /// Value-receiver method returning the field.
    Getter,
    /// Pointer-receiver method assigning the field from `s`.
    Setter,
}

impl MethodKind {
    /// Built-in template for this kind.
    #[must_use]
    pub const fn default_template(self) -> &'static str {
        match self {
            Self::Getter => GETTER_TEMPLATE,
            Self::Setter => SETTER_TEMPLATE,
        }
    }

    /// Prefix placed before the upper-camel field name when the tag value
    /// is empty.
    #[must_use]
    pub const fn default_prefix(self) -> &'static str {
        match self {
            Self::Getter => "",
            Self::Setter => "Set",
        }
    }
}

/// One entry of a [`TagVocabulary`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRule {
    /// Struct tag key, e.g. `getter`.
    pub key: String,
    /// Kind of method generated.
    pub kind: MethodKind,
    /// Method template. Sees `receiver`, `struct_name`, `method_name`,
    /// `field_name` and `field_type`.
    pub template: String,
    /// Prefix for default method names.
    pub default_prefix: String,
}

impl TagRule {
    /// Rule generating getters with the built-in template.
    #[must_use]
    pub fn getter(key: impl Into<String>) -> Self {
        Self::for_kind(key, MethodKind::Getter)
    }

    /// Rule generating setters with the built-in template.
    #[must_use]
    pub fn setter(key: impl Into<String>) -> Self {
        Self::for_kind(key, MethodKind::Setter)
    }

    fn for_kind(key: impl Into<String>, kind: MethodKind) -> Self {
        Self {
            key: key.into(),
            kind,
            template: kind.default_template().to_owned(),
            default_prefix: kind.default_prefix().to_owned(),
        }
    }

    /// Name used when the tag value is empty.
    #[must_use]
    pub fn default_method_name(&self, field_name: &str) -> String {
        format!("{}{}", self.default_prefix, upper_camel(field_name))
    }
}

/// The vocabulary cannot be extended with a rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum VocabularyError {
    /// Two rules share a key.
    #[error("tag key `{0}` is already defined")]
    DuplicateKey(String),
    /// A key could never match in a struct tag.
    #[error("`{0}` is not a usable struct tag key")]
    InvalidKey(String),
}

/// Ordered tag key table. Methods for one field are generated in rule
/// order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagVocabulary {
    rules: Vec<TagRule>,
}

impl TagVocabulary {
    /// Vocabulary without rules.
    #[must_use]
    pub const fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// The `getter` and `setter` keys.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            rules: vec![TagRule::getter("getter"), TagRule::setter("setter")],
        }
    }

    /// Appends `rule`.
    ///
    /// # Errors
    ///
    /// Returns a [`VocabularyError`] if the key is already used or contains
    /// characters that end a tag key (space, `:`, `"` or control
    /// characters).
    pub fn with_rule(mut self, rule: TagRule) -> Result<Self, VocabularyError> {
        if rule.key.is_empty()
            || rule
                .key
                .chars()
                .any(|c| c <= ' ' || c == ':' || c == '"' || c == '\u{7f}')
        {
            return Err(VocabularyError::InvalidKey(rule.key));
        }
        if self.rules.iter().any(|existing| existing.key == rule.key) {
            return Err(VocabularyError::DuplicateKey(rule.key));
        }
        self.rules.push(rule);
        Ok(self)
    }

    /// Rules in generation order.
    #[must_use]
    pub fn rules(&self) -> &[TagRule] {
        &self.rules
    }

    /// Returns `true` if any rule's key appears in `tag`.
    #[must_use]
    pub fn matches(&self, tag: &str) -> bool {
        self.rules
            .iter()
            .any(|rule| crate::tag::lookup(tag, &rule.key).is_some())
    }
}

impl Default for TagVocabulary {
    fn default() -> Self {
        Self::standard()
    }
}
