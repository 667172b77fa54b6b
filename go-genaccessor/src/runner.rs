//! Executes one `go-genaccessor` invocation.

use std::io::{self, Write};

use camino::Utf8Path;
use genaccessor::sink::{DirSink, MemorySink, test_file_name};
use genaccessor::{FileFilter, FileInfo, Generator, RunSummary};
use tracing::{debug, info};

use crate::cli::Args;
use crate::config::{self, Config};
use crate::error::CliError;

/// File names a unit pattern produces, split around `{package}`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct OutputName {
    prefix: String,
    suffix: Option<String>,
}

impl OutputName {
    fn new(pattern: &str) -> Self {
        let (prefix, suffix) = pattern.split_once("{package}").map_or_else(
            || (pattern.to_owned(), None),
            |(prefix, suffix)| (prefix.to_owned(), Some(suffix.to_owned())),
        );
        Self { prefix, suffix }
    }

    fn matches(&self, name: &str) -> bool {
        self.suffix.as_deref().map_or_else(
            || name == self.prefix,
            |suffix| {
                name.len() > self.prefix.len() + suffix.len()
                    && name.starts_with(self.prefix.as_str())
                    && name.ends_with(suffix)
            },
        )
    }
}

/// Selects the `.go` files a run reads.
///
/// Previously generated units, test units included, are always skipped so
/// that stale accessors never feed back into type checking. `_test.go` files
/// are skipped unless `include_tests` is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFilter {
    outputs: [OutputName; 2],
    include_tests: bool,
}

impl SourceFilter {
    /// Filter for units named after `pattern`.
    #[must_use]
    pub fn new(pattern: &str, include_tests: bool) -> Self {
        Self {
            outputs: [
                OutputName::new(pattern),
                OutputName::new(&test_file_name(pattern)),
            ],
            include_tests,
        }
    }

    /// Returns `true` if `file` should be parsed.
    #[must_use]
    pub fn accepts(&self, file: &FileInfo<'_>) -> bool {
        if !self.include_tests && file.name.ends_with("_test.go") {
            return false;
        }
        !self.outputs.iter().any(|output| output.matches(file.name))
    }
}

/// Loads configuration for `args` and generates every package in the
/// target directory.
///
/// # Errors
///
/// Returns a [`CliError`] when configuration is invalid, generation fails
/// or a dry-run unit cannot be printed.
pub fn run(args: &Args) -> Result<RunSummary, CliError> {
    let config = config::load(args)?;
    debug!(config = ?config, "resolved configuration");
    run_with(args, &config, &mut io::stdout().lock())
}

/// Generates with an already loaded `config`, printing dry-run units to
/// `out`.
///
/// # Errors
///
/// See [`run`].
pub fn run_with(args: &Args, config: &Config, out: &mut dyn Write) -> Result<RunSummary, CliError> {
    let generator = Generator::new(config.generate_options()?)?;
    let filter = SourceFilter::new(&config.output, config.include_tests);
    let accepts: &FileFilter<'_> = &|file| filter.accepts(file);

    if !args.is_dry_run {
        let mut sink = DirSink::new(config.output.as_str());
        let summary = generator.run(&args.target, Some(accepts), &mut sink)?;
        info!(
            packages = summary.packages,
            units = summary.units,
            methods = summary.methods,
            "generation finished"
        );
        return Ok(summary);
    }

    let mut sink = MemorySink::new();
    let summary = generator.run(&args.target, Some(accepts), &mut sink)?;
    let names = DirSink::new(config.output.as_str());
    for unit in sink.into_units() {
        let path = unit.dir.join(names.file_name(&unit.package, unit.test));
        print_unit(out, &path, &unit.contents)?;
    }
    Ok(summary)
}

fn print_unit(out: &mut dyn Write, path: &Utf8Path, contents: &str) -> Result<(), CliError> {
    writeln!(out, "// {path}")
        .and_then(|()| out.write_all(contents.as_bytes()))
        .and_then(|()| out.flush())
        .map_err(|source| CliError::Stdout {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    //! Unit tests for source selection.

    use super::*;
    use rstest::rstest;

    fn info(name: &str) -> FileInfo<'_> {
        FileInfo { name, size: 0 }
    }

    #[rstest]
    #[case("user.go", false, true)]
    #[case("user_test.go", false, false)]
    #[case("user_test.go", true, true)]
    #[case("models_genaccessor.go", false, false)]
    #[case("models_genaccessor.go", true, false)]
    #[case("_genaccessor.go", false, true)]
    #[case("models_genaccessor_test.go", true, false)]
    #[case("models_test_genaccessor_test.go", true, false)]
    #[case("genaccessor_test.go", true, true)]
    fn default_pattern(#[case] name: &str, #[case] include_tests: bool, #[case] expected: bool) {
        let filter = SourceFilter::new("{package}_genaccessor.go", include_tests);
        assert_eq!(filter.accepts(&info(name)), expected);
    }

    #[rstest]
    #[case("accessors.go", false)]
    #[case("accessors_test.go", false)]
    #[case("user.go", true)]
    fn fixed_output_name(#[case] name: &str, #[case] expected: bool) {
        let filter = SourceFilter::new("accessors.go", true);
        assert_eq!(filter.accepts(&info(name)), expected);
    }

    #[rstest]
    fn prefixed_pattern() {
        let filter = SourceFilter::new("zz_{package}.go", false);
        assert!(!filter.accepts(&info("zz_models.go")));
        assert!(filter.accepts(&info("models.go")));
    }
}
