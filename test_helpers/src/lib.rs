//! Test helpers shared across the genaccessor workspace.
//!
//! - [`env`]: serialised environment variable guards, including a scope that
//!   hides the host's Go toolchain settings.
//! - [`cwd`]: a working-directory guard.
//! - [`figment`]: a `figment::Jail` wrapper returning `anyhow` results.
//! - [`gotree`]: temporary Go source trees.
//! - [`text`]: indentation stripping for inline Go fixtures.

pub mod cwd;
pub mod env;
pub mod figment;
pub mod gotree;
pub mod text;
