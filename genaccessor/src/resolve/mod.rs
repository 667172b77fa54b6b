//! Field type resolution.
//!
//! A resolver turns a field's type expression into text that is valid in the
//! generated file and reports the packages that text refers to. Two
//! strategies exist: [`SemanticResolver`] resolves names through a
//! type-checked model of the package and its imports, while
//! [`SyntacticResolver`] reprints the type and matches qualifiers against the
//! declaring file's imports.

mod error;
mod semantic;
mod syntactic;

use serde::{Deserialize, Serialize};

use crate::imports::ImportRef;
use crate::loader::{Package, ParsedFile};
use crate::syntax::TypeExpr;

pub use error::ResolveError;
pub use semantic::SemanticResolver;
pub use syntactic::SyntacticResolver;

/// Which resolver the pipeline uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolverMode {
    /// Semantic when a `GOROOT` is known, syntactic otherwise.
    #[default]
    Auto,
    /// Always semantic.
    Semantic,
    /// Always syntactic.
    Syntactic,
}

/// Where a field is declared.
#[derive(Debug, Clone, Copy)]
pub struct FieldSite<'a> {
    /// Package being generated.
    pub package: &'a Package,
    /// File declaring the struct.
    pub file: &'a ParsedFile,
    /// Type parameter names of the enclosing struct.
    pub type_params: &'a [String],
}

/// Output-ready type text and the imports it needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedType {
    /// Type expression as it appears in the generated file.
    pub text: String,
    /// Packages referenced by [`ResolvedType::text`].
    pub imports: Vec<ImportRef>,
}

/// A field type resolution strategy.
pub trait TypeResolver {
    /// Short strategy name for diagnostics.
    fn strategy(&self) -> &'static str;

    /// Called once per package before any of its fields are resolved.
    ///
    /// # Errors
    ///
    /// Implementations report package-wide problems such as unresolvable
    /// imports here.
    fn prepare(&mut self, _package: &Package) -> Result<(), ResolveError> {
        Ok(())
    }

    /// Resolves `ty`, declared at `site`.
    ///
    /// # Errors
    ///
    /// Returns a [`ResolveError`] when the type cannot be expressed in the
    /// output unit.
    fn resolve(
        &mut self,
        site: &FieldSite<'_>,
        ty: &TypeExpr,
    ) -> Result<ResolvedType, ResolveError>;
}
