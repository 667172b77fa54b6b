//! Type resolution failures.

use camino::Utf8PathBuf;
use thiserror::Error;

use crate::goenv::GoEnvError;
use crate::loader::LoadError;
use crate::syntax::ParseError;

/// A field type that cannot be expressed in the output unit.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ResolveError {
    /// A name is not declared in any visible scope.
    #[error("undefined: {name}")]
    Undefined {
        /// Name as written, qualified when it was qualified.
        name: String,
    },
    /// A qualified name refers to an unexported declaration.
    #[error("name {name} not exported by package {package}")]
    Unexported {
        /// Package identifier.
        package: String,
        /// Unexported name.
        name: String,
    },
    /// An import path does not resolve to a package.
    #[error("could not import {path}: package not found")]
    UnresolvedImport {
        /// Import path.
        path: String,
    },
    /// An imported directory failed to load.
    #[error("could not import {path}: {source}")]
    Load {
        /// Import path.
        path: String,
        /// Loader failure.
        #[source]
        source: LoadError,
    },
    /// Aliases refer to each other.
    #[error("invalid recursive type alias {name}")]
    AliasCycle {
        /// Alias at which the cycle closed.
        name: String,
    },
    /// A file imports `C`.
    #[error("{file}: cgo imports are not supported")]
    Cgo {
        /// File containing `import "C"`.
        file: Utf8PathBuf,
    },
    /// Two type declarations share a name.
    #[error("{name} redeclared in this package ({first} and {second})")]
    Redeclared {
        /// Declared name.
        name: String,
        /// File of the first declaration.
        first: Utf8PathBuf,
        /// File of the second declaration.
        second: Utf8PathBuf,
    },
    /// The Go environment could not be discovered.
    #[error(transparent)]
    Env(#[from] GoEnvError),
    /// Printed type text failed to re-lex.
    #[error("malformed type text: {0}")]
    Syntax(#[from] ParseError),
}
