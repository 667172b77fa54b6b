//! Name resolution through a checked model of the package and its imports.

use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use camino::Utf8Path;
use tracing::debug;

use super::{FieldSite, ResolveError, ResolvedType, TypeResolver};
use crate::goenv::GoEnv;
use crate::imports::ImportRef;
use crate::loader::{Package, load_import_dir};
use crate::syntax::{
    ArrayLen, FieldDecl, ImportSpec, InterfaceElem, ParamGroup, Signature, Token, TokenKind,
    TypeExpr, TypeName, TypeSpec, TypeTerm, is_exported,
};

/// Predeclared type names of the universe scope.
const UNIVERSE_TYPES: [&str; 22] = [
    "any",
    "bool",
    "byte",
    "comparable",
    "complex64",
    "complex128",
    "error",
    "float32",
    "float64",
    "int",
    "int8",
    "int16",
    "int32",
    "int64",
    "rune",
    "string",
    "uint",
    "uint8",
    "uint16",
    "uint32",
    "uint64",
    "uintptr",
];

/// Predeclared constants and functions that may appear in array lengths.
const UNIVERSE_VALUES: [&str; 12] = [
    "true", "false", "iota", "nil", "len", "cap", "complex", "real", "imag", "min", "max", "unsafe",
];

/// A type declaration and the imports of the file declaring it.
#[derive(Debug)]
struct DeclaredType {
    spec: TypeSpec,
    imports: Rc<Vec<ImportSpec>>,
}

/// An imported package's identity and type declarations.
#[derive(Debug)]
struct ImportedPackage {
    path: String,
    name: String,
    types: BTreeMap<String, DeclaredType>,
}

impl ImportedPackage {
    fn declares(&self, name: &str) -> bool {
        if self.path == "unsafe" {
            return name == "Pointer";
        }
        self.types.contains_key(name)
    }
}

/// Package-level type declarations of the package being generated.
#[derive(Debug, Default)]
struct LocalModel {
    types: BTreeMap<String, DeclaredType>,
    files: HashMap<String, Rc<Vec<ImportSpec>>>,
}

/// Lexical context a type expression is resolved in.
#[derive(Debug, Clone)]
struct Scope {
    /// `None` for the package being generated.
    origin: Option<Rc<ImportedPackage>>,
    imports: Rc<Vec<ImportSpec>>,
    type_params: Rc<Vec<String>>,
}

/// Resolves field types the way the Go type checker sees them.
///
/// Qualified names are looked up through the declaring file's imports using
/// each imported package's declared name, and aliases are followed to their
/// targets. Types from other packages are written `name.Type` with the
/// package's path recorded as an import. `name` is the declared package
/// name unless another path of the same unit already took it; then the
/// source's own qualifier is used, or a numbered one when that is taken too.
#[derive(Debug)]
pub struct SemanticResolver {
    env: GoEnv,
    cache: HashMap<String, Rc<ImportedPackage>>,
    local: LocalModel,
    /// Import path to the identifier the output unit uses for it.
    qualifiers: BTreeMap<String, String>,
}

impl SemanticResolver {
    /// Creates a resolver locating imports through `env`.
    #[must_use]
    pub fn new(env: GoEnv) -> Self {
        Self {
            env,
            cache: HashMap::new(),
            local: LocalModel::default(),
            qualifiers: BTreeMap::new(),
        }
    }

    /// Binds `package` to an identifier of the output unit. `written` is the
    /// qualifier the source used for it, if any.
    fn qualifier(&mut self, package: &ImportedPackage, written: Option<&str>) -> ImportRef {
        if let Some(name) = self.qualifiers.get(&package.path) {
            return ImportRef::new(package.path.as_str(), name.as_str());
        }
        let taken = |name: &str| {
            self.qualifiers.values().any(|bound| bound == name)
                || self.local.types.contains_key(name)
        };
        let name = [Some(package.name.as_str()), written]
            .into_iter()
            .flatten()
            .find(|name| !taken(*name))
            .map_or_else(
                || {
                    (2_u32..)
                        .map(|n| format!("{}{n}", package.name))
                        .find(|name| !taken(name.as_str()))
                        .unwrap_or_default()
                },
                str::to_owned,
            );
        if name != package.name {
            debug!(import = %package.path, name = %name, "renamed import to avoid a clash");
        }
        self.qualifiers.insert(package.path.clone(), name.clone());
        ImportRef::new(package.path.as_str(), name)
    }

    fn import(&mut self, path: &str) -> Result<Rc<ImportedPackage>, ResolveError> {
        if let Some(package) = self.cache.get(path) {
            return Ok(Rc::clone(package));
        }
        let unresolved = || ResolveError::UnresolvedImport {
            path: path.to_owned(),
        };
        let imported = if path == "unsafe" {
            ImportedPackage {
                path: path.to_owned(),
                name: "unsafe".to_owned(),
                types: BTreeMap::new(),
            }
        } else {
            let dir = self.env.locate(path).ok_or_else(unresolved)?;
            let package = load_import_dir(&dir)
                .map_err(|source| ResolveError::Load {
                    path: path.to_owned(),
                    source,
                })?
                .ok_or_else(unresolved)?;
            debug!(import = path, name = %package.name, dir = %dir, "loaded imported package");
            ImportedPackage {
                path: path.to_owned(),
                name: package.name.clone(),
                types: declared_types(&package, false)?,
            }
        };
        let imported = Rc::new(imported);
        self.cache.insert(path.to_owned(), Rc::clone(&imported));
        Ok(imported)
    }

    /// Finds the package a qualifier refers to in `scope`.
    fn qualified_package(
        &mut self,
        scope: &Scope,
        qualifier: &str,
    ) -> Result<Option<Rc<ImportedPackage>>, ResolveError> {
        for spec in scope.imports.iter() {
            match spec.name.as_deref() {
                Some("." | "_") => {}
                Some(name) if name == qualifier => return self.import(&spec.path).map(Some),
                Some(_) => {}
                None => {
                    let package = self.import(&spec.path)?;
                    if package.name == qualifier {
                        return Ok(Some(package));
                    }
                }
            }
        }
        Ok(None)
    }

    fn resolve_expr(
        &mut self,
        scope: &Scope,
        ty: &TypeExpr,
        imports: &mut Vec<ImportRef>,
        visiting: &mut Vec<String>,
    ) -> Result<TypeExpr, ResolveError> {
        Ok(match ty {
            TypeExpr::Named(name) => self.resolve_name(scope, name, imports, visiting)?,
            TypeExpr::Pointer(inner) => {
                TypeExpr::Pointer(Box::new(self.resolve_expr(scope, inner, imports, visiting)?))
            }
            TypeExpr::Slice(elem) => {
                TypeExpr::Slice(Box::new(self.resolve_expr(scope, elem, imports, visiting)?))
            }
            TypeExpr::Array { len, elem } => TypeExpr::Array {
                len: self.resolve_len(scope, len, imports)?,
                elem: Box::new(self.resolve_expr(scope, elem, imports, visiting)?),
            },
            TypeExpr::Map { key, value } => TypeExpr::Map {
                key: Box::new(self.resolve_expr(scope, key, imports, visiting)?),
                value: Box::new(self.resolve_expr(scope, value, imports, visiting)?),
            },
            TypeExpr::Chan { dir, elem } => TypeExpr::Chan {
                dir: *dir,
                elem: Box::new(self.resolve_expr(scope, elem, imports, visiting)?),
            },
            TypeExpr::Func(sig) => {
                TypeExpr::Func(self.resolve_signature(scope, sig, imports, visiting)?)
            }
            TypeExpr::Struct(fields) => {
                let mut out = Vec::with_capacity(fields.len());
                for field in fields {
                    out.push(FieldDecl {
                        names: field.names.clone(),
                        ty: self.resolve_expr(scope, &field.ty, imports, visiting)?,
                        tag: field.tag.clone(),
                    });
                }
                TypeExpr::Struct(out)
            }
            TypeExpr::Interface(elems) => {
                let mut out = Vec::with_capacity(elems.len());
                for elem in elems {
                    out.push(match elem {
                        InterfaceElem::Method { name, sig } => InterfaceElem::Method {
                            name: name.clone(),
                            sig: self.resolve_signature(scope, sig, imports, visiting)?,
                        },
                        InterfaceElem::Type(ty) => {
                            InterfaceElem::Type(self.resolve_expr(scope, ty, imports, visiting)?)
                        }
                    });
                }
                TypeExpr::Interface(out)
            }
            TypeExpr::Union(terms) => {
                let mut out = Vec::with_capacity(terms.len());
                for term in terms {
                    out.push(TypeTerm {
                        tilde: term.tilde,
                        ty: self.resolve_expr(scope, &term.ty, imports, visiting)?,
                    });
                }
                TypeExpr::Union(out)
            }
            TypeExpr::Paren(inner) => {
                TypeExpr::Paren(Box::new(self.resolve_expr(scope, inner, imports, visiting)?))
            }
        })
    }

    fn resolve_signature(
        &mut self,
        scope: &Scope,
        sig: &Signature,
        imports: &mut Vec<ImportRef>,
        visiting: &mut Vec<String>,
    ) -> Result<Signature, ResolveError> {
        let mut groups = |list: &[ParamGroup], this: &mut Self| -> Result<_, ResolveError> {
            let mut out = Vec::with_capacity(list.len());
            for group in list {
                out.push(ParamGroup {
                    names: group.names.clone(),
                    ty: this.resolve_expr(scope, &group.ty, imports, visiting)?,
                    variadic: group.variadic,
                });
            }
            Ok(out)
        };
        let params = groups(&sig.params, self)?;
        let results = groups(&sig.results, self)?;
        Ok(Signature { params, results })
    }

    fn resolve_args(
        &mut self,
        scope: &Scope,
        args: &[TypeExpr],
        imports: &mut Vec<ImportRef>,
        visiting: &mut Vec<String>,
    ) -> Result<Vec<TypeExpr>, ResolveError> {
        args.iter()
            .map(|arg| self.resolve_expr(scope, arg, imports, visiting))
            .collect()
    }

    fn resolve_name(
        &mut self,
        scope: &Scope,
        name: &TypeName,
        imports: &mut Vec<ImportRef>,
        visiting: &mut Vec<String>,
    ) -> Result<TypeExpr, ResolveError> {
        let args = self.resolve_args(scope, &name.args, imports, visiting)?;

        if let Some(qualifier) = &name.package {
            let package = self
                .qualified_package(scope, qualifier)?
                .ok_or_else(|| ResolveError::Undefined {
                    name: format!("{qualifier}.{}", name.name),
                })?;
            return self.remote_type(
                &package,
                &name.name,
                Some(qualifier.as_str()),
                args,
                imports,
                visiting,
            );
        }

        if scope.type_params.iter().any(|param| *param == name.name) {
            return Ok(TypeExpr::Named(TypeName {
                package: None,
                name: name.name.clone(),
                args,
            }));
        }

        match &scope.origin {
            None => {
                if let Some(declared) = self.local.types.get(&name.name) {
                    if declared.spec.alias && declared.spec.type_params.is_empty() {
                        let target = declared.spec.ty.clone();
                        let alias_scope = Scope {
                            origin: None,
                            imports: Rc::clone(&declared.imports),
                            type_params: Rc::new(Vec::new()),
                        };
                        return self.follow_alias(
                            &alias_scope,
                            &name.name,
                            &target,
                            imports,
                            visiting,
                        );
                    }
                    return Ok(TypeExpr::Named(TypeName {
                        package: None,
                        name: name.name.clone(),
                        args,
                    }));
                }
            }
            Some(origin) => {
                if origin.declares(&name.name) {
                    let origin = Rc::clone(origin);
                    return self.remote_type(&origin, &name.name, None, args, imports, visiting);
                }
            }
        }

        for spec in scope.imports.iter() {
            if spec.name.as_deref() != Some(".") {
                continue;
            }
            let package = self.import(&spec.path)?;
            if package.declares(&name.name) && is_exported(&name.name) {
                return self.remote_type(&package, &name.name, None, args, imports, visiting);
            }
        }

        if UNIVERSE_TYPES.contains(&name.name.as_str()) {
            return Ok(TypeExpr::Named(TypeName {
                package: None,
                name: name.name.clone(),
                args,
            }));
        }
        Err(ResolveError::Undefined {
            name: name.name.clone(),
        })
    }

    /// A type declared in another package, as seen from the output unit.
    fn remote_type(
        &mut self,
        package: &Rc<ImportedPackage>,
        name: &str,
        written: Option<&str>,
        args: Vec<TypeExpr>,
        imports: &mut Vec<ImportRef>,
        visiting: &mut Vec<String>,
    ) -> Result<TypeExpr, ResolveError> {
        if !is_exported(name) {
            return Err(ResolveError::Unexported {
                package: package.name.clone(),
                name: name.to_owned(),
            });
        }
        if package.path == "unsafe" {
            if name != "Pointer" {
                return Err(ResolveError::Undefined {
                    name: format!("unsafe.{name}"),
                });
            }
        } else {
            let declared =
                package
                    .types
                    .get(name)
                    .ok_or_else(|| ResolveError::Undefined {
                        name: format!("{}.{name}", package.name),
                    })?;
            if declared.spec.alias && declared.spec.type_params.is_empty() {
                let target = declared.spec.ty.clone();
                let alias_scope = Scope {
                    origin: Some(Rc::clone(package)),
                    imports: Rc::clone(&declared.imports),
                    type_params: Rc::new(Vec::new()),
                };
                let key = format!("{}.{name}", package.path);
                return self.follow_alias(&alias_scope, &key, &target, imports, visiting);
            }
        }
        let import = self.qualifier(package, written);
        let qualifier = import.name.clone();
        imports.push(import);
        Ok(TypeExpr::Named(TypeName {
            package: Some(qualifier),
            name: name.to_owned(),
            args,
        }))
    }

    fn follow_alias(
        &mut self,
        scope: &Scope,
        key: &str,
        target: &TypeExpr,
        imports: &mut Vec<ImportRef>,
        visiting: &mut Vec<String>,
    ) -> Result<TypeExpr, ResolveError> {
        if visiting.iter().any(|seen| seen == key) {
            return Err(ResolveError::AliasCycle {
                name: key.to_owned(),
            });
        }
        visiting.push(key.to_owned());
        let resolved = self.resolve_expr(scope, target, imports, visiting);
        visiting.pop();
        resolved
    }

    /// Rewrites identifiers in an array length so they name the same
    /// constants from the output unit.
    fn resolve_len(
        &mut self,
        scope: &Scope,
        len: &ArrayLen,
        imports: &mut Vec<ImportRef>,
    ) -> Result<ArrayLen, ResolveError> {
        let ArrayLen::Expr(tokens) = len else {
            return Ok(ArrayLen::Ellipsis);
        };
        let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
        let mut index = 0;
        while let Some(token) = tokens.get(index) {
            let is_selector = tokens.get(index + 1).is_some_and(|t| t.is_punct("."));
            let after_dot = index
                .checked_sub(1)
                .and_then(|prev| tokens.get(prev))
                .is_some_and(|t| t.is_punct("."));
            if token.kind != TokenKind::Ident || after_dot {
                out.push(token.clone());
                index += 1;
                continue;
            }
            if is_selector && let Some(package) = self.qualified_package(scope, &token.text)? {
                if let Some(member) = tokens.get(index + 2)
                    && !is_exported(&member.text)
                {
                    return Err(ResolveError::Unexported {
                        package: package.name.clone(),
                        name: member.text.clone(),
                    });
                }
                let import = self.qualifier(&package, Some(token.text.as_str()));
                out.push(Token {
                    text: import.name.clone(),
                    ..token.clone()
                });
                imports.push(import);
                index += 1;
                continue;
            }
            match &scope.origin {
                Some(origin) if !UNIVERSE_VALUES.contains(&token.text.as_str()) && !is_selector => {
                    if !is_exported(&token.text) {
                        return Err(ResolveError::Unexported {
                            package: origin.name.clone(),
                            name: token.text.clone(),
                        });
                    }
                    let import = self.qualifier(origin, None);
                    out.push(Token {
                        text: format!("{}.{}", import.name, token.text),
                        ..token.clone()
                    });
                    imports.push(import);
                }
                _ => out.push(token.clone()),
            }
            index += 1;
        }
        Ok(ArrayLen::Expr(out))
    }
}

/// Collects package-level type declarations. With `strict`, a name declared
/// twice is an error; otherwise the first declaration wins.
fn declared_types(
    package: &Package,
    strict: bool,
) -> Result<BTreeMap<String, DeclaredType>, ResolveError> {
    let mut types: BTreeMap<String, DeclaredType> = BTreeMap::new();
    let mut origins: HashMap<String, &Utf8Path> = HashMap::new();
    for file in &package.files {
        let imports = Rc::new(file.ast.imports.clone());
        for spec in &file.ast.types {
            if spec.name == "_" {
                continue;
            }
            if let Some(first) = origins.get(&spec.name) {
                if strict {
                    return Err(ResolveError::Redeclared {
                        name: spec.name.clone(),
                        first: first.to_path_buf(),
                        second: file.path.clone(),
                    });
                }
                continue;
            }
            origins.insert(spec.name.clone(), &file.path);
            types.insert(
                spec.name.clone(),
                DeclaredType {
                    spec: spec.clone(),
                    imports: Rc::clone(&imports),
                },
            );
        }
    }
    Ok(types)
}

impl TypeResolver for SemanticResolver {
    fn strategy(&self) -> &'static str {
        "semantic"
    }

    fn prepare(&mut self, package: &Package) -> Result<(), ResolveError> {
        let types = declared_types(package, true)?;
        let mut files = HashMap::new();
        for file in &package.files {
            for spec in &file.ast.imports {
                if spec.path == "C" {
                    return Err(ResolveError::Cgo {
                        file: file.path.clone(),
                    });
                }
                self.import(&spec.path)?;
            }
            files.insert(file.name.clone(), Rc::new(file.ast.imports.clone()));
        }
        self.local = LocalModel { types, files };
        self.qualifiers.clear();
        Ok(())
    }

    fn resolve(
        &mut self,
        site: &FieldSite<'_>,
        ty: &TypeExpr,
    ) -> Result<ResolvedType, ResolveError> {
        let imports = self
            .local
            .files
            .get(&site.file.name)
            .map_or_else(|| Rc::new(site.file.ast.imports.clone()), Rc::clone);
        let scope = Scope {
            origin: None,
            imports,
            type_params: Rc::new(site.type_params.to_vec()),
        };
        let mut refs = Vec::new();
        let resolved = self.resolve_expr(&scope, ty, &mut refs, &mut Vec::new())?;
        Ok(ResolvedType {
            text: resolved.to_string(),
            imports: refs,
        })
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for the semantic resolver.

    use super::*;
    use crate::goenv::GoEnvOptions;
    use crate::loader::load_dir;
    use crate::syntax::parse_type;
    use rstest::rstest;
    use test_helpers::gotree::GoTree;

    fn fixture() -> GoTree {
        GoTree::new()
            .file("goroot/src/time/time.go", "package time\n\ntype Time struct{ wall uint64 }\ntype Duration int64\ntype month int\n")
            .file("goroot/src/unsafe/unsafe.go", "package unsafe\n")
            .file(
                "app/go.mod",
                "module example.com/app\n\nrequire example.com/lib/v2 v2.0.0\n\nreplace example.com/lib/v2 => ../lib\n",
            )
            .file(
                "lib/lib.go",
                "package lib\n\nimport \"time\"\n\nconst Size = 4\n\ntype Thing struct{}\ntype Stamp = time.Time\ntype Loop = Loop2\ntype Loop2 = Loop\ntype Box[T any] struct{ v T }\n",
            )
    }

    fn resolver_for(tree: &GoTree, source: &str) -> (SemanticResolver, Package) {
        tree.write("app/models/models.go", source);
        let options = GoEnvOptions {
            goroot: Some(tree.path().join("goroot")),
            explicit_only: true,
            ..GoEnvOptions::default()
        };
        let dir = tree.path().join("app/models");
        let env = GoEnv::discover(&dir, &options).expect("discover");
        let mut packages = load_dir(&dir, None).expect("load");
        let package = packages.remove(0);
        let mut resolver = SemanticResolver::new(env);
        resolver.prepare(&package).expect("prepare");
        (resolver, package)
    }

    fn resolve(
        resolver: &mut SemanticResolver,
        package: &Package,
        params: &[String],
        ty: &str,
    ) -> Result<ResolvedType, ResolveError> {
        let site = FieldSite {
            package,
            file: &package.files[0],
            type_params: params,
        };
        resolver.resolve(&site, &parse_type(ty).expect("type"))
    }

    const HEADER: &str = "package models\n\nimport (\n\ttm \"time\"\n\t\"example.com/lib/v2\"\n\t. \"unsafe\"\n)\n\ntype Local struct{}\ntype Alias = tm.Duration\n";

    #[rstest]
    #[case("tm.Time", "time.Time", vec![("time", "time")])]
    #[case("lib.Thing", "lib.Thing", vec![("example.com/lib/v2", "lib")])]
    #[case("lib.Stamp", "time.Time", vec![("time", "time")])]
    #[case("Alias", "time.Duration", vec![("time", "time")])]
    #[case("*Local", "*Local", vec![])]
    #[case("map[string][]error", "map[string][]error", vec![])]
    #[case("lib.Box[tm.Duration]", "lib.Box[time.Duration]", vec![("time", "time"), ("example.com/lib/v2", "lib")])]
    #[case("Pointer", "unsafe.Pointer", vec![("unsafe", "unsafe")])]
    #[case("[lib.Size]byte", "[lib.Size]byte", vec![("example.com/lib/v2", "lib")])]
    fn resolves_through_declared_names(
        #[case] ty: &str,
        #[case] text: &str,
        #[case] imports: Vec<(&str, &str)>,
    ) {
        let tree = fixture();
        let (mut resolver, package) = resolver_for(&tree, HEADER);
        let resolved = resolve(&mut resolver, &package, &[], ty).expect("resolve");
        assert_eq!(resolved.text, text);
        let expected: Vec<ImportRef> = imports
            .into_iter()
            .map(|(path, name)| ImportRef::new(path, name))
            .collect();
        assert_eq!(resolved.imports, expected);
    }

    fn site_in<'p>(package: &'p Package, file: &str) -> FieldSite<'p> {
        FieldSite {
            package,
            file: package
                .files
                .iter()
                .find(|parsed| parsed.name == file)
                .expect("file in package"),
            type_params: &[],
        }
    }

    #[rstest]
    fn packages_sharing_a_name_get_distinct_qualifiers() {
        let tree = fixture()
            .file("goroot/src/math/rand/rand.go", "package rand\n\ntype Rand struct{}\n")
            .file("goroot/src/crypto/rand/rand.go", "package rand\n\ntype Source struct{}\n")
            .file("app/models/other.go", "package models\n\nimport \"crypto/rand\"\n");
        let (mut resolver, package) =
            resolver_for(&tree, "package models\n\nimport \"math/rand\"\n");
        let mut resolve_in = |file: &str, ty: &str| {
            resolver
                .resolve(&site_in(&package, file), &parse_type(ty).expect("type"))
                .expect("resolve")
        };

        let math = resolve_in("models.go", "*rand.Rand");
        let crypto = resolve_in("other.go", "rand.Source");
        let again = resolve_in("other.go", "[]rand.Source");

        assert_eq!(math.text, "*rand.Rand");
        assert_eq!(math.imports, vec![ImportRef::new("math/rand", "rand")]);
        assert_eq!(crypto.text, "rand2.Source");
        assert_eq!(crypto.imports, vec![ImportRef::new("crypto/rand", "rand2")]);
        assert_eq!(again.text, "[]rand2.Source");
    }

    #[rstest]
    fn type_parameters_resolve_to_themselves() {
        let tree = fixture();
        let (mut resolver, package) = resolver_for(&tree, HEADER);
        let resolved = resolve(&mut resolver, &package, &["T".to_owned()], "[]T").expect("resolve");
        assert_eq!(resolved.text, "[]T");
        assert!(resolved.imports.is_empty());
    }

    #[rstest]
    #[case("Missing", "undefined: Missing")]
    #[case("tm.month", "name month not exported by package time")]
    #[case("lib.Loop", "invalid recursive type alias example.com/lib/v2.Loop")]
    #[case("nope.Thing", "undefined: nope.Thing")]
    fn reports_type_errors(#[case] ty: &str, #[case] message: &str) {
        let tree = fixture();
        let (mut resolver, package) = resolver_for(&tree, HEADER);
        let err = resolve(&mut resolver, &package, &[], ty).expect_err("type error");
        assert_eq!(err.to_string(), message);
    }

    #[rstest]
    fn unresolvable_imports_fail_preparation() {
        let tree = fixture().file(
            "app/models/models.go",
            "package models\n\nimport \"example.com/absent\"\n",
        );
        let options = GoEnvOptions {
            goroot: Some(tree.path().join("goroot")),
            explicit_only: true,
            ..GoEnvOptions::default()
        };
        let dir = tree.path().join("app/models");
        let env = GoEnv::discover(&dir, &options).expect("discover");
        let package = load_dir(&dir, None).expect("load").remove(0);
        let err = SemanticResolver::new(env)
            .prepare(&package)
            .expect_err("missing import");
        assert!(matches!(err, ResolveError::UnresolvedImport { path } if path == "example.com/absent"));
    }

    #[rstest]
    fn cgo_imports_are_rejected() {
        let tree = fixture();
        let tree = tree.file("app/models/models.go", "package models\n\nimport \"C\"\n");
        let package = load_dir(&tree.path().join("app/models"), None)
            .expect("load")
            .remove(0);
        let err = SemanticResolver::new(GoEnv::default())
            .prepare(&package)
            .expect_err("cgo");
        assert!(matches!(err, ResolveError::Cgo { .. }));
    }

    #[rstest]
    fn redeclared_types_are_rejected() {
        let tree = GoTree::new()
            .file("a.go", "package demo\n\ntype T struct{}\n")
            .file("b.go", "package demo\n\ntype T int\n");
        let package = load_dir(tree.path(), None).expect("load").remove(0);
        let err = SemanticResolver::new(GoEnv::default())
            .prepare(&package)
            .expect_err("redeclared");
        assert!(matches!(err, ResolveError::Redeclared { name, .. } if name == "T"));
    }
}
