//! Command-line interface definitions for `go-genaccessor`.

use camino::Utf8PathBuf;
use clap::{ArgAction, Parser, ValueEnum};
use genaccessor::{FormatterKind, ResolverMode};

/// Type resolution strategies selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ResolverArg {
    /// Semantic when a GOROOT is known, syntactic otherwise.
    Auto,
    /// Resolve names through the imported packages.
    Semantic,
    /// Match qualifiers against the file's imports.
    Syntactic,
}

impl From<ResolverArg> for ResolverMode {
    fn from(arg: ResolverArg) -> Self {
        match arg {
            ResolverArg::Auto => Self::Auto,
            ResolverArg::Semantic => Self::Semantic,
            ResolverArg::Syntactic => Self::Syntactic,
        }
    }
}

/// Formatters selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatterArg {
    /// Built-in token formatter.
    Builtin,
    /// External `gofmt`.
    Gofmt,
}

impl From<FormatterArg> for FormatterKind {
    fn from(arg: FormatterArg) -> Self {
        match arg {
            FormatterArg::Builtin => Self::Builtin,
            FormatterArg::Gofmt => Self::Gofmt,
        }
    }
}

/// Parsed CLI arguments for `go-genaccessor`.
#[derive(Debug, Clone, Parser)]
#[command(name = "go-genaccessor")]
#[command(about = "Generate getters and setters for tagged Go struct fields")]
#[command(version)]
pub struct Args {
    /// Directory holding the Go package(s).
    #[arg(value_name = "dir", default_value = ".")]
    pub target: Utf8PathBuf,
    /// Configuration file; defaults to `.genaccessor.toml` in the target
    /// directory when present.
    #[arg(long, value_name = "path")]
    pub config: Option<Utf8PathBuf>,
    /// Output file name; `{package}` is replaced by the package name.
    #[arg(long, value_name = "pattern")]
    pub output: Option<String>,
    /// Name written in the `Code generated by` banner.
    #[arg(long, value_name = "name")]
    pub generator_name: Option<String>,
    /// Type resolution strategy.
    #[arg(long, value_enum)]
    pub resolver: Option<ResolverArg>,
    /// Formatter for generated files.
    #[arg(long, value_enum)]
    pub formatter: Option<FormatterArg>,
    /// `gofmt` binary used with `--formatter gofmt`.
    #[arg(long, value_name = "path")]
    pub gofmt_bin: Option<Utf8PathBuf>,
    /// Standard library root for semantic resolution.
    #[arg(long, value_name = "path")]
    pub goroot: Option<Utf8PathBuf>,
    /// Also read `_test.go` files.
    #[arg(long = "include-tests")]
    pub should_include_tests: bool,
    /// Print generated files to standard output instead of writing them.
    #[arg(long = "dry-run")]
    pub is_dry_run: bool,
    /// Increase log verbosity (`-v` debug, `-vv` trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}
