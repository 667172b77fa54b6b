//! Declaration-level syntax tree for Go source files.
//!
//! Only the parts of a file that accessor generation needs are modelled:
//! the package clause, imports and type declarations. Function, variable and
//! constant declarations are skipped by the parser.

use super::token::Token;

/// A parsed `.go` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Name from the package clause.
    pub package: String,
    /// Import specs in source order.
    pub imports: Vec<ImportSpec>,
    /// Type specs in source order; grouped declarations are flattened.
    pub types: Vec<TypeSpec>,
    /// Set when a `//go:build ignore` or `// +build ignore` line precedes
    /// the package clause.
    pub build_ignored: bool,
}

/// One import spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec {
    /// Explicit name: an alias, `.` or `_`.
    pub name: Option<String>,
    /// Unquoted import path.
    pub path: String,
    /// Line of the path literal.
    pub line: u32,
}

impl ImportSpec {
    /// Last `/`-separated segment of the path.
    #[must_use]
    pub fn basename(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

/// A type declaration, `type Name[P any] T` or `type Name = T`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSpec {
    /// Declared name.
    pub name: String,
    /// Type parameter list; empty for non-generic types.
    pub type_params: Vec<TypeParam>,
    /// `true` for alias declarations.
    pub alias: bool,
    /// Right-hand side.
    pub ty: TypeExpr,
    /// Line of the declared name.
    pub line: u32,
}

impl TypeSpec {
    /// Names of the type parameters in declaration order.
    pub fn type_param_names(&self) -> impl Iterator<Item = &str> {
        self.type_params
            .iter()
            .flat_map(|group| group.names.iter().map(String::as_str))
    }
}

/// A group of type parameters sharing one constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParam {
    /// Parameter names.
    pub names: Vec<String>,
    /// Constraint expression.
    pub constraint: TypeExpr,
}

/// A Go type expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    /// Possibly qualified, possibly instantiated type name.
    Named(TypeName),
    /// `*T`
    Pointer(Box<TypeExpr>),
    /// `[]T`
    Slice(Box<TypeExpr>),
    /// `[N]T` or `[...]T`
    Array {
        /// Length expression.
        len: ArrayLen,
        /// Element type.
        elem: Box<TypeExpr>,
    },
    /// `map[K]V`
    Map {
        /// Key type.
        key: Box<TypeExpr>,
        /// Value type.
        value: Box<TypeExpr>,
    },
    /// `chan T`, `chan<- T` or `<-chan T`
    Chan {
        /// Direction.
        dir: ChanDir,
        /// Element type.
        elem: Box<TypeExpr>,
    },
    /// `func(...) ...`
    Func(Signature),
    /// `struct{ ... }`
    Struct(Vec<FieldDecl>),
    /// `interface{ ... }`
    Interface(Vec<InterfaceElem>),
    /// `A | ~B`, only valid inside constraints.
    Union(Vec<TypeTerm>),
    /// `(T)`
    Paren(Box<TypeExpr>),
}

impl TypeExpr {
    /// Shorthand for an unqualified, uninstantiated name.
    #[must_use]
    pub fn ident(name: impl Into<String>) -> Self {
        Self::Named(TypeName {
            package: None,
            name: name.into(),
            args: Vec::new(),
        })
    }
}

/// Reference to a named type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeName {
    /// Package qualifier, as written.
    pub package: Option<String>,
    /// Type name.
    pub name: String,
    /// Type arguments for generic instantiation.
    pub args: Vec<TypeExpr>,
}

/// Array length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArrayLen {
    /// `[...]`, only legal in composite literals.
    Ellipsis,
    /// Constant expression, kept as tokens.
    Expr(Vec<Token>),
}

/// Channel direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChanDir {
    /// `chan T`
    Both,
    /// `chan<- T`
    Send,
    /// `<-chan T`
    Recv,
}

/// Parameters and results of a function type or method.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    /// Parameter groups.
    pub params: Vec<ParamGroup>,
    /// Result groups.
    pub results: Vec<ParamGroup>,
}

/// Names sharing one type in a parameter list. Unnamed parameters have no
/// names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamGroup {
    /// Parameter names; empty when unnamed.
    pub names: Vec<String>,
    /// Parameter type.
    pub ty: TypeExpr,
    /// `true` for a trailing `...T` parameter.
    pub variadic: bool,
}

/// One field declaration of a struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    /// Field names; empty for embedded fields.
    pub names: Vec<String>,
    /// Field type. For embedded fields this is the embedded type.
    pub ty: TypeExpr,
    /// Tag literal, if any.
    pub tag: Option<StructTag>,
}

impl FieldDecl {
    /// Returns `true` for embedded (anonymous) fields.
    #[must_use]
    pub fn is_embedded(&self) -> bool {
        self.names.is_empty()
    }

    /// Names selecting the field: the declared names, or the type name of
    /// an embedded field.
    pub fn selectors(&self) -> impl Iterator<Item = &str> {
        let embedded = match &self.ty {
            TypeExpr::Pointer(inner) => match inner.as_ref() {
                TypeExpr::Named(name) => Some(name.name.as_str()),
                _ => None,
            },
            TypeExpr::Named(name) => Some(name.name.as_str()),
            _ => None,
        };
        self.names
            .iter()
            .map(String::as_str)
            .chain(embedded.filter(|_| self.is_embedded()))
    }
}

/// A struct tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructTag {
    /// Literal as written, quotes included.
    pub literal: String,
    /// Decoded value.
    pub value: String,
}

/// Element of an interface body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterfaceElem {
    /// Method specification.
    Method {
        /// Method name.
        name: String,
        /// Method signature.
        sig: Signature,
    },
    /// Embedded type or type-set element.
    Type(TypeExpr),
}

/// A term of a union element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeTerm {
    /// `true` for `~T`.
    pub tilde: bool,
    /// The term's type.
    pub ty: TypeExpr,
}
