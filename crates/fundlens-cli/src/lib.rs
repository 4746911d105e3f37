//! FundLens CLI library.
//!
//! Configuration, argument parsing, command execution and output formatting
//! for the `fundlens` command-line tool.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
pub use output::Formatter;

/// Log filter used when `RUST_LOG` is unset or `-v` is given.
pub fn log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    }
}
