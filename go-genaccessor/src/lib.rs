//! Command-line front end for `genaccessor`.
//!
//! The binary is meant to run from a `go generate` directive:
//!
//! ```go
//! //go:generate go-genaccessor
//! ```
//!
//! It generates the package in its target directory (the current one by
//! default), reading settings from `.genaccessor.toml`, `GENACCESSOR_*`
//! environment variables and flags, in increasing precedence.

pub mod cli;
pub mod config;
pub mod error;
pub mod runner;
