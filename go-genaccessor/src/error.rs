//! Error types for `go-genaccessor`.

use camino::Utf8PathBuf;
use genaccessor::GenerateError;
use genaccessor::vocabulary::VocabularyError;
use thiserror::Error;

/// Errors surfaced by the `go-genaccessor` command.
#[derive(Debug, Error)]
pub enum CliError {
    /// A configuration layer failed to parse or extract.
    #[error("invalid configuration: {0}")]
    Config(Box<figment::Error>),

    /// `--config` names a file that does not exist.
    #[error("configuration file {0} not found")]
    MissingConfig(Utf8PathBuf),

    /// A configured tag key cannot be added.
    #[error("invalid tag configuration: {0}")]
    Vocabulary(#[from] VocabularyError),

    /// The generation run failed.
    #[error(transparent)]
    Generate(#[from] GenerateError),

    /// A dry-run unit could not be printed.
    #[error("failed to write {path} to standard output: {source}")]
    Stdout {
        /// File that was being printed.
        path: Utf8PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}
