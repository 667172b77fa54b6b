//! Layered configuration: defaults, file, environment, then flags.
//!
//! The file is `.genaccessor.toml` in the target directory unless
//! `--config` names another. Environment variables use the `GENACCESSOR_`
//! prefix with `__` separating nested keys (`GENACCESSOR_GO__GOROOT`).
//!
//! ```toml
//! output = "{package}_accessors.go"
//! resolver = "semantic"
//!
//! [go]
//! goroot = "/usr/local/go"
//!
//! [[tags]]
//! key = "get"
//! kind = "getter"
//! ```

use camino::{Utf8Path, Utf8PathBuf};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use genaccessor::sink::DEFAULT_OUTPUT_PATTERN;
use genaccessor::{
    DEFAULT_GENERATOR_NAME, FormatterKind, GenerateOptions, GoEnvOptions, MethodKind,
    ResolverMode, TagRule, TagVocabulary,
};
use serde::{Deserialize, Serialize};

use crate::cli::Args;
use crate::error::CliError;

/// Configuration file looked up in the target directory.
pub const CONFIG_FILE_NAME: &str = ".genaccessor.toml";

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "GENACCESSOR_";

/// An additional tag key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagConfig {
    /// Struct tag key.
    pub key: String,
    /// Kind of method generated.
    pub kind: MethodKind,
    /// Method template; the kind's built-in template when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    /// Default name prefix; the kind's prefix when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
}

impl TagConfig {
    fn rule(&self) -> TagRule {
        let mut rule = match self.kind {
            MethodKind::Getter => TagRule::getter(self.key.as_str()),
            MethodKind::Setter => TagRule::setter(self.key.as_str()),
        };
        if let Some(template) = &self.template {
            rule.template.clone_from(template);
        }
        if let Some(prefix) = &self.prefix {
            rule.default_prefix.clone_from(prefix);
        }
        rule
    }
}

/// Resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Output file name pattern.
    pub output: String,
    /// Banner generator name.
    pub generator_name: String,
    /// Type resolution strategy.
    pub resolver: ResolverMode,
    /// Formatter for generated files.
    pub formatter: FormatterKind,
    /// `gofmt` binary.
    pub gofmt_bin: Option<Utf8PathBuf>,
    /// Whether `_test.go` files are read.
    pub include_tests: bool,
    /// Toolchain locations.
    pub go: GoEnvOptions,
    /// Tag keys added to `getter` and `setter`.
    pub tags: Vec<TagConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output: DEFAULT_OUTPUT_PATTERN.to_owned(),
            generator_name: DEFAULT_GENERATOR_NAME.to_owned(),
            resolver: ResolverMode::default(),
            formatter: FormatterKind::default(),
            gofmt_bin: None,
            include_tests: false,
            go: GoEnvOptions::default(),
            tags: Vec::new(),
        }
    }
}

/// Values given on the command line; unset ones leave lower layers intact.
#[derive(Debug, Default, Serialize)]
struct CliOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generator_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    resolver: Option<ResolverMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    formatter: Option<FormatterKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    gofmt_bin: Option<Utf8PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    include_tests: Option<bool>,
    go: GoOverrides,
}

#[derive(Debug, Default, Serialize)]
struct GoOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    goroot: Option<Utf8PathBuf>,
}

impl From<&Args> for CliOverrides {
    fn from(args: &Args) -> Self {
        Self {
            output: args.output.clone(),
            generator_name: args.generator_name.clone(),
            resolver: args.resolver.map(Into::into),
            formatter: args.formatter.map(Into::into),
            gofmt_bin: args.gofmt_bin.clone(),
            include_tests: args.should_include_tests.then_some(true),
            go: GoOverrides {
                goroot: args.goroot.clone(),
            },
        }
    }
}

/// The configuration file for `args`: `--config` when given, otherwise
/// `.genaccessor.toml` in the target directory.
#[must_use]
pub fn config_path(args: &Args) -> Utf8PathBuf {
    args.config
        .clone()
        .unwrap_or_else(|| args.target.join(CONFIG_FILE_NAME))
}

/// Merges every configuration layer for `args`.
///
/// # Errors
///
/// Returns [`CliError::MissingConfig`] when `--config` names a file that
/// does not exist, and [`CliError::Config`] when a layer fails to parse or
/// holds a value of the wrong type.
pub fn load(args: &Args) -> Result<Config, CliError> {
    let path = config_path(args);
    if args.config.is_some() && !path.is_file() {
        return Err(CliError::MissingConfig(path));
    }
    figment(&path, args)
        .extract()
        .map_err(|source| CliError::Config(Box::new(source)))
}

fn figment(path: &Utf8Path, args: &Args) -> Figment {
    Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(path.as_std_path()))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .merge(Serialized::defaults(CliOverrides::from(args)))
}

impl Config {
    /// Converts the configuration into library options.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Vocabulary`] when a configured tag key is invalid
    /// or duplicates another.
    pub fn generate_options(&self) -> Result<GenerateOptions, CliError> {
        let vocabulary = self
            .tags
            .iter()
            .try_fold(TagVocabulary::standard(), |vocabulary, tag| {
                vocabulary.with_rule(tag.rule())
            })?;
        Ok(GenerateOptions {
            generator_name: self.generator_name.clone(),
            resolver: self.resolver,
            go_env: self.go.clone(),
            vocabulary,
            formatter: self.formatter,
            gofmt_bin: self.gofmt_bin.clone(),
        })
    }
}
