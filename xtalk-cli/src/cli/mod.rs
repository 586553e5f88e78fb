//! Command-line orchestration for xtalk.
//!
//! Parses the flag surface, loads the network and group files through the
//! provider crates, drives the core analysis, and writes the results and
//! info files.

mod commands;

pub use commands::{Cli, CliError, ExecutionSummary, render_summary, run_cli};
