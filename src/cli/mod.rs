//! CLI module for Roster
//!
//! Provides command-line interface for:
//! - init: Write a default configuration file
//! - serve: Start the HTTP server

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command};
pub use commands::{init, run, run_command, serve};
pub use errors::{CliError, CliErrorCode, CliResult};
