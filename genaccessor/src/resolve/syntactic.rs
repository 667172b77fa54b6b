//! Qualifier matching against the declaring file's imports.

use std::collections::BTreeSet;

use super::{FieldSite, ResolveError, ResolvedType, TypeResolver};
use crate::imports::ImportRef;
use crate::syntax::{ImportSpec, TokenKind, TypeExpr, tokenize};

/// Reprints field types as written and attaches the imports whose names
/// appear as qualifiers.
///
/// Unnamed imports match by the last segment of their path, so packages
/// whose declared name differs from their path (`example.com/lib/v2`
/// declaring `package lib`) are not found. Aliases are not followed.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntacticResolver;

impl SyntacticResolver {
    /// Creates the resolver.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

fn qualifiers(text: &str) -> Result<BTreeSet<String>, ResolveError> {
    let tokens = tokenize(text)?;
    let mut found = BTreeSet::new();
    for (index, window) in tokens.windows(3).enumerate() {
        let [qualifier, dot, name] = window else {
            continue;
        };
        let after_selector = index
            .checked_sub(1)
            .and_then(|prev| tokens.get(prev))
            .is_some_and(|prev| prev.is_punct("."));
        if qualifier.kind == TokenKind::Ident
            && dot.is_punct(".")
            && name.kind == TokenKind::Ident
            && !after_selector
        {
            found.insert(qualifier.text.clone());
        }
    }
    Ok(found)
}

fn matching_import<'i>(imports: &'i [ImportSpec], qualifier: &str) -> Option<&'i ImportSpec> {
    imports.iter().find(|spec| {
        spec.name
            .as_deref()
            .map_or_else(|| spec.basename() == qualifier, |name| name == qualifier)
    })
}

impl TypeResolver for SyntacticResolver {
    fn strategy(&self) -> &'static str {
        "syntactic"
    }

    fn resolve(
        &mut self,
        site: &FieldSite<'_>,
        ty: &TypeExpr,
    ) -> Result<ResolvedType, ResolveError> {
        let text = ty.to_string();
        let imports = qualifiers(&text)?
            .into_iter()
            .filter_map(|qualifier| {
                matching_import(&site.file.ast.imports, &qualifier)
                    .map(|spec| ImportRef::new(spec.path.as_str(), qualifier))
            })
            .collect();
        Ok(ResolvedType { text, imports })
    }
}
