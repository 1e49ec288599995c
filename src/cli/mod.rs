//! CLI module for tledb
//!
//! Provides command-line interface for:
//! - serve: open the database and serve the HTTP API
//! - init: create the schema
//! - load: bulk-load TLE text files

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{
    init, load, resolve_config, run, run_command, serve, LoadOptions, ServeOverrides,
};
pub use errors::{CliError, CliErrorCode, CliResult};
