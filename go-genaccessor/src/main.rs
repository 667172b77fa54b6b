//! CLI entrypoint for `go-genaccessor`.

use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use go_genaccessor::cli::Args;
use go_genaccessor::error::CliError;
use go_genaccessor::runner;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);
    match runner::run(&args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

/// Logs go to standard error so dry-run output stays clean. `RUST_LOG`
/// overrides the level picked by `-v`.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .with(filter)
        .init();
}

/// Error messages already embed their causes.
fn report(err: &CliError) {
    writeln!(io::stderr().lock(), "go-genaccessor: {err}").unwrap_or_default();
}
