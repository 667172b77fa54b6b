//! Errors surfaced by a generation run.

use std::io;

use camino::Utf8PathBuf;
use thiserror::Error;

use crate::format::FormatError;
use crate::goenv::GoEnvError;
use crate::imports::ImportError;
use crate::loader::LoadError;
use crate::resolve::ResolveError;
use crate::tag::TagError;

/// Failure of a generation run. Every variant aborts the run; nothing is
/// written for the failing package or any package after it.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GenerateError {
    /// The directory or one of its files could not be loaded.
    #[error(transparent)]
    Load(#[from] LoadError),
    /// The Go environment could not be discovered.
    #[error(transparent)]
    Env(#[from] GoEnvError),
    /// Semantic resolution was requested but no `GOROOT` is known.
    #[error("semantic resolution needs a GOROOT; set GOROOT or install the go command")]
    EnvironmentUnavailable,
    /// A package or field type failed to type-check.
    #[error("type checking package {package} failed: {file}: {source}")]
    TypeCheck {
        /// Package being generated.
        package: String,
        /// File in which the failure was found.
        file: Utf8PathBuf,
        /// Resolver failure.
        #[source]
        source: Box<ResolveError>,
    },
    /// A tag names invalid methods.
    #[error("{struct_name}.{field}: {source}")]
    InvalidTag {
        /// Struct declaring the field.
        struct_name: String,
        /// Field carrying the tag.
        field: String,
        /// Tag failure.
        #[source]
        source: TagError,
    },
    /// Two fields or tags of one struct request the same method.
    #[error("method {struct_name}.{method} is generated more than once")]
    DuplicateMethod {
        /// Receiver struct.
        struct_name: String,
        /// Method name.
        method: String,
    },
    /// A requested method has the name of a field of its struct.
    #[error("method {struct_name}.{method} has the same name as a field of {struct_name}")]
    MethodNamesField {
        /// Receiver struct.
        struct_name: String,
        /// Method name.
        method: String,
    },
    /// Referenced packages cannot share one import block.
    #[error("package {package}: {source}")]
    Imports {
        /// Package being generated.
        package: String,
        /// Conflict.
        #[source]
        source: ImportError,
    },
    /// A template failed to compile or render.
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),
    /// The assembled unit failed to format.
    #[error("formatting package {package} failed: {source}")]
    Format {
        /// Package being generated.
        package: String,
        /// Formatter failure.
        #[source]
        source: FormatError,
    },
    /// The sink failed to open, write or close a unit.
    #[error("writing package {package} failed: {source}")]
    Sink {
        /// Package being generated.
        package: String,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
}
