//! Accessor method generation for tagged Go struct fields.
//!
//! `genaccessor` reads a directory of Go source, finds struct fields tagged
//! with `getter` or `setter` and writes one `Code generated` file per
//! package holding the requested methods:
//!
//! ```go
//! type User struct {
//!     name string `getter:"" setter:""`
//! }
//! ```
//!
//! becomes
//!
//! ```go
//! func (m User) Name() string {
//!     return m.name
//! }
//!
//! func (m *User) SetName(s string) {
//!     m.name = s
//! }
//! ```
//!
//! The [`Generator`] drives a run. Field types are rendered by a
//! [`TypeResolver`](resolve::TypeResolver), units are normalized by a
//! [`SourceFormatter`](format::SourceFormatter) and handed to a
//! [`UnitSink`](sink::UnitSink).
//!
//! ```no_run
//! use camino::Utf8Path;
//! use genaccessor::{GenerateOptions, Generator, sink::DirSink};
//!
//! # fn main() -> Result<(), genaccessor::GenerateError> {
//! let generator = Generator::new(GenerateOptions::default())?;
//! let summary = generator.run(Utf8Path::new("./models"), None, &mut DirSink::default())?;
//! println!("generated {} methods", summary.methods);
//! # Ok(())
//! # }
//! ```

pub mod assemble;
mod error;
pub mod format;
mod fs_helpers;
pub mod goenv;
pub mod gomod;
pub mod imports;
pub mod loader;
mod pipeline;
pub mod resolve;
pub mod scan;
pub mod sink;
pub mod synth;
pub mod syntax;
pub mod tag;
pub mod templates;
pub mod vocabulary;

pub use error::GenerateError;
pub use format::FormatterKind;
pub use goenv::GoEnvOptions;
pub use loader::{FileFilter, FileInfo};
pub use pipeline::{DEFAULT_GENERATOR_NAME, GenerateOptions, Generator, RunSummary};
pub use resolve::ResolverMode;
pub use vocabulary::{MethodKind, TagRule, TagVocabulary};
