//! Discovery of tagged struct fields in a package.

use crate::loader::{Package, ParsedFile};
use crate::syntax::{FieldDecl, TypeExpr, TypeSpec};
use crate::vocabulary::TagVocabulary;

/// A named struct field whose tag carries at least one known key.
#[derive(Debug, Clone, Copy)]
pub struct TaggedField<'p> {
    /// File declaring the struct.
    pub file: &'p ParsedFile,
    /// The struct's type declaration.
    pub declaration: &'p TypeSpec,
    /// Field name. A declaration listing several names yields one entry per
    /// name.
    pub name: &'p str,
    /// The field declaration the name belongs to.
    pub field: &'p FieldDecl,
}

impl<'p> TaggedField<'p> {
    /// Declared struct name.
    #[must_use]
    pub fn struct_name(&self) -> &'p str {
        &self.declaration.name
    }

    /// Decoded tag text.
    #[must_use]
    pub fn tag(&self) -> &'p str {
        self.field.tag.as_ref().map_or("", |tag| tag.value.as_str())
    }

    /// Returns `true` when the enclosing struct has a field, embedded or
    /// not, selected by `name`.
    #[must_use]
    pub fn struct_has_field(&self, name: &str) -> bool {
        struct_fields(self.declaration)
            .unwrap_or_default()
            .iter()
            .any(|field| field.selectors().any(|selector| selector == name))
    }

    /// Type parameter names of the enclosing struct, in declaration order.
    #[must_use]
    pub fn type_params(&self) -> Vec<String> {
        self.declaration
            .type_param_names()
            .map(str::to_owned)
            .collect()
    }
}

fn struct_fields(spec: &TypeSpec) -> Option<&[FieldDecl]> {
    match &spec.ty {
        TypeExpr::Struct(fields) if !spec.alias => Some(fields),
        _ => None,
    }
}

/// Lazily walks `package` in file-name order, then source order, yielding
/// every tagged field of every struct declaration.
///
/// Alias declarations, non-struct types, embedded fields and fields whose
/// tag names no key of `vocabulary` are skipped.
pub fn tagged_fields<'p>(
    package: &'p Package,
    vocabulary: &'p TagVocabulary,
) -> impl Iterator<Item = TaggedField<'p>> + 'p {
    package
        .type_specs()
        .filter_map(|(file, spec)| struct_fields(spec).map(|fields| (file, spec, fields)))
        .flat_map(move |(file, declaration, fields)| {
            fields
                .iter()
                .filter(|field| !field.is_embedded())
                .filter(move |field| {
                    field
                        .tag
                        .as_ref()
                        .is_some_and(|tag| vocabulary.matches(&tag.value))
                })
                .flat_map(move |field| {
                    field.names.iter().map(move |name| TaggedField {
                        file,
                        declaration,
                        name: name.as_str(),
                        field,
                    })
                })
        })
}
