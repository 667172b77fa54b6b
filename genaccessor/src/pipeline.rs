//! The generation run: load, scan, resolve, synthesize, assemble, write.

use std::collections::HashSet;
use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, info, warn};

use crate::assemble::{AssembleError, UnitContext, assemble};
use crate::error::GenerateError;
use crate::format::{FormatterKind, SourceFormatter};
use crate::goenv::{GoEnv, GoEnvOptions};
use crate::imports::ImportSet;
use crate::loader::{FileFilter, Package, load_dir};
use crate::resolve::{
    FieldSite, ResolveError, ResolverMode, SemanticResolver, SyntacticResolver, TypeResolver,
};
use crate::scan::{TaggedField, tagged_fields};
use crate::sink::{UnitSink, UnitTarget};
use crate::synth::{GenerationRequest, synthesize};
use crate::tag::requested_methods;
use crate::templates::Templates;
use crate::vocabulary::{TagRule, TagVocabulary};

/// Generator name used in the banner unless overridden.
pub const DEFAULT_GENERATOR_NAME: &str = "go-genaccessor";

/// Settings for a [`Generator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Name shown in the `Code generated by` banner.
    pub generator_name: String,
    /// Type resolution strategy.
    pub resolver: ResolverMode,
    /// Toolchain locations for semantic resolution.
    pub go_env: GoEnvOptions,
    /// Recognised tag keys.
    pub vocabulary: TagVocabulary,
    /// Formatter applied to each unit.
    pub formatter: FormatterKind,
    /// `gofmt` binary for [`FormatterKind::Gofmt`].
    pub gofmt_bin: Option<Utf8PathBuf>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            generator_name: DEFAULT_GENERATOR_NAME.to_owned(),
            resolver: ResolverMode::default(),
            go_env: GoEnvOptions::default(),
            vocabulary: TagVocabulary::standard(),
            formatter: FormatterKind::default(),
            gofmt_bin: None,
        }
    }
}

/// Counts describing a completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Packages found in the directory.
    pub packages: usize,
    /// Units handed to the sink.
    pub units: usize,
    /// Methods generated across all units.
    pub methods: usize,
}

/// A formatted unit of one package.
struct PackageUnit {
    test: bool,
    contents: String,
    methods: usize,
}

/// Generates accessor units for the packages of a directory.
pub struct Generator {
    options: GenerateOptions,
    templates: Templates,
    formatter: Box<dyn SourceFormatter>,
}

impl std::fmt::Debug for Generator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Generator")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Generator {
    /// Compiles the templates of `options.vocabulary` and instantiates the
    /// configured formatter.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::Template`] when a template does not compile.
    pub fn new(options: GenerateOptions) -> Result<Self, GenerateError> {
        let templates = Templates::new(&options.vocabulary)?;
        let formatter = options.formatter.build(options.gofmt_bin.as_deref());
        Ok(Self {
            options,
            templates,
            formatter,
        })
    }

    /// Replaces the formatter.
    #[must_use]
    pub fn with_formatter(mut self, formatter: Box<dyn SourceFormatter>) -> Self {
        self.formatter = formatter;
        self
    }

    /// Options the generator was built with.
    #[must_use]
    pub const fn options(&self) -> &GenerateOptions {
        &self.options
    }

    /// Generates every package in `dir`, in package-name order, handing each
    /// non-empty unit to `sink`.
    ///
    /// `filter` selects which `.go` files are read; every file is read
    /// without one.
    ///
    /// # Errors
    ///
    /// Returns the first [`GenerateError`]. Packages after the failing one
    /// are not processed.
    pub fn run(
        &self,
        dir: &Utf8Path,
        filter: Option<&FileFilter<'_>>,
        sink: &mut dyn UnitSink,
    ) -> Result<RunSummary, GenerateError> {
        let packages = load_dir(dir, filter)?;
        let mut summary = RunSummary {
            packages: packages.len(),
            ..RunSummary::default()
        };
        if packages.is_empty() {
            debug!(dir = %dir, "no Go files selected");
            return Ok(summary);
        }
        let mut resolver = self.resolver(dir)?;
        debug!(dir = %dir, strategy = resolver.strategy(), "resolving field types");

        for package in &packages {
            let units = self.generate_package(resolver.as_mut(), package)?;
            if units.is_empty() {
                debug!(package = %package.name, "no accessors requested");
            }
            for unit in units {
                let target = UnitTarget {
                    package,
                    test: unit.test,
                };
                write_unit(sink, &target, &unit.contents)?;
                info!(
                    package = %package.name,
                    test = unit.test,
                    methods = unit.methods,
                    "wrote accessor unit"
                );
                summary.units += 1;
                summary.methods += unit.methods;
            }
        }
        Ok(summary)
    }

    fn resolver(&self, dir: &Utf8Path) -> Result<Box<dyn TypeResolver>, GenerateError> {
        if self.options.resolver == ResolverMode::Syntactic {
            return Ok(Box::new(SyntacticResolver::new()));
        }
        let env = GoEnv::discover(dir, &self.options.go_env)?;
        if env.goroot.is_some() {
            return Ok(Box::new(SemanticResolver::new(env)));
        }
        if self.options.resolver == ResolverMode::Semantic {
            return Err(GenerateError::EnvironmentUnavailable);
        }
        warn!("no GOROOT found; falling back to syntactic type resolution");
        Ok(Box::new(SyntacticResolver::new()))
    }

    /// Method names requested by each rule whose key appears on `field`.
    fn requests<'v>(
        vocabulary: &'v TagVocabulary,
        field: &TaggedField<'_>,
    ) -> Result<Vec<(&'v TagRule, Vec<String>)>, GenerateError> {
        let mut methods = Vec::new();
        for rule in vocabulary.rules() {
            let names = requested_methods(field.tag(), rule, field.name).map_err(|source| {
                GenerateError::InvalidTag {
                    struct_name: field.struct_name().to_owned(),
                    field: field.name.to_owned(),
                    source,
                }
            })?;
            if let Some(names) = names {
                methods.push((rule, names));
            }
        }
        Ok(methods)
    }

    /// Builds the units of `package`: one for structs declared in ordinary
    /// files and one for structs declared in `_test.go` files, each only when
    /// it requests a method.
    fn generate_package(
        &self,
        resolver: &mut dyn TypeResolver,
        package: &Package,
    ) -> Result<Vec<PackageUnit>, GenerateError> {
        resolver
            .prepare(package)
            .map_err(type_check(package, &package.dir))?;
        let (test_fields, fields): (Vec<_>, Vec<_>) =
            tagged_fields(package, &self.options.vocabulary).partition(|field| field.file.is_test());

        let mut units = Vec::new();
        for (test, fields) in [(false, fields), (true, test_fields)] {
            if let Some((contents, methods)) = self.generate_unit(resolver, package, &fields)? {
                units.push(PackageUnit {
                    test,
                    contents,
                    methods,
                });
            }
        }
        Ok(units)
    }

    /// Formatted unit holding the methods requested by `fields` and its
    /// method count, or `None` when no method is requested.
    fn generate_unit(
        &self,
        resolver: &mut dyn TypeResolver,
        package: &Package,
        fields: &[TaggedField<'_>],
    ) -> Result<Option<(String, usize)>, GenerateError> {
        let mut imports = ImportSet::new();
        let mut methods = Vec::new();
        let mut seen: HashSet<(String, String)> = HashSet::new();

        for &field in fields {
            let requests = Self::requests(&self.options.vocabulary, &field)?;
            let type_params = field.type_params();
            let site = FieldSite {
                package,
                file: field.file,
                type_params: &type_params,
            };
            let resolved = resolver
                .resolve(&site, &field.field.ty)
                .map_err(type_check(package, &field.file.path))?;
            debug!(
                package = %package.name,
                field = %format_args!("{}.{}", field.struct_name(), field.name),
                ty = %resolved.text,
                "resolved field type"
            );
            imports
                .extend(resolved.imports)
                .map_err(|source| GenerateError::Imports {
                    package: package.name.clone(),
                    source,
                })?;

            for (rule, names) in requests {
                for method_name in names {
                    let key = (field.struct_name().to_owned(), method_name.clone());
                    if !seen.insert(key) {
                        return Err(GenerateError::DuplicateMethod {
                            struct_name: field.struct_name().to_owned(),
                            method: method_name,
                        });
                    }
                    if field.struct_has_field(&method_name) {
                        return Err(GenerateError::MethodNamesField {
                            struct_name: field.struct_name().to_owned(),
                            method: method_name,
                        });
                    }
                    let request = GenerationRequest::new(
                        rule,
                        field.struct_name(),
                        &type_params,
                        field.name,
                        &resolved.text,
                        method_name,
                    );
                    methods.push(synthesize(&self.templates, &request)?);
                }
            }
        }

        let context = UnitContext::new(
            &self.options.generator_name,
            &package.name,
            &imports,
            &methods,
        );
        let unit = assemble(&self.templates, self.formatter.as_ref(), &context).map_err(
            |err| match err {
                AssembleError::Template(source) => GenerateError::Template(source),
                AssembleError::Format(source) => GenerateError::Format {
                    package: package.name.clone(),
                    source,
                },
            },
        )?;
        Ok(unit.map(|unit| (unit, methods.len())))
    }
}

fn type_check<'p>(
    package: &'p Package,
    file: &Utf8Path,
) -> impl FnOnce(ResolveError) -> GenerateError + use<'p> {
    let file = file.to_path_buf();
    move |source| GenerateError::TypeCheck {
        package: package.name.clone(),
        file,
        source: Box::new(source),
    }
}

/// Writes `unit` through a writer opened on `sink`, closing the writer even
/// when the write fails.
fn write_unit(
    sink: &mut dyn UnitSink,
    target: &UnitTarget<'_>,
    unit: &str,
) -> Result<(), GenerateError> {
    let sink_error = |source| GenerateError::Sink {
        package: target.package.name.clone(),
        source,
    };
    let mut writer = sink.open(target).map_err(sink_error)?;
    let written = writer.write_all(unit.as_bytes());
    let closed = writer.close();
    written.and(closed).map_err(sink_error)
}
