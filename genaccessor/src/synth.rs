//! Rendering of individual accessor methods.

use serde::Serialize;

use crate::templates::Templates;
use crate::vocabulary::{MethodKind, TagRule};

/// One method to generate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationRequest {
    /// Tag key that requested the method.
    pub key: String,
    /// Kind of method.
    pub kind: MethodKind,
    /// Receiver base type, including type parameter names for generic
    /// structs (`Box[T]`).
    pub receiver: String,
    /// Declared struct name.
    pub struct_name: String,
    /// Field the method accesses.
    pub field_name: String,
    /// Field type as it must appear in the output unit.
    pub field_type: String,
    /// Method name.
    pub method_name: String,
}

impl GenerationRequest {
    /// Builds a request for `rule` on a field of `struct_name`.
    #[must_use]
    pub fn new(
        rule: &TagRule,
        struct_name: &str,
        type_params: &[String],
        field_name: &str,
        field_type: &str,
        method_name: String,
    ) -> Self {
        Self {
            key: rule.key.clone(),
            kind: rule.kind,
            receiver: receiver_type(struct_name, type_params),
            struct_name: struct_name.to_owned(),
            field_name: field_name.to_owned(),
            field_type: field_type.to_owned(),
            method_name,
        }
    }
}

/// Receiver type text: `T` or `T[A, B]`.
#[must_use]
pub fn receiver_type(struct_name: &str, type_params: &[String]) -> String {
    if type_params.is_empty() {
        struct_name.to_owned()
    } else {
        format!("{struct_name}[{}]", type_params.join(", "))
    }
}

/// Renders the method declaration for `request`.
///
/// # Errors
///
/// Returns the template error; callers treat it as fatal.
pub fn synthesize(
    templates: &Templates,
    request: &GenerationRequest,
) -> Result<String, minijinja::Error> {
    templates.render_method(&request.key, request)
}

#[cfg(test)]
mod tests {
    //! Unit tests for method synthesis.

    use super::*;
    use crate::vocabulary::TagVocabulary;
    use rstest::rstest;

    #[rstest]
    #[case(&[], "User")]
    #[case(&["T".to_owned()], "Box[T]")]
    #[case(&["K".to_owned(), "V".to_owned()], "Box[K, V]")]
    fn builds_receiver_types(#[case] params: &[String], #[case] expected: &str) {
        let struct_name = if params.is_empty() { "User" } else { "Box" };
        assert_eq!(receiver_type(struct_name, params), expected);
    }

    #[rstest]
    fn generic_setter_uses_instantiated_receiver() {
        let templates = Templates::new(&TagVocabulary::standard()).expect("templates");
        let request = GenerationRequest::new(
            &TagRule::setter("setter"),
            "Box",
            &["T".to_owned()],
            "value",
            "T",
            "SetValue".to_owned(),
        );
        let text = synthesize(&templates, &request).expect("render");
        assert_eq!(text, "func (m *Box[T]) SetValue(s T) {\n\tm.value = s\n}\n");
    }
}
