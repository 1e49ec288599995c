//! CLI argument definitions using clap
//!
//! Commands:
//! - tledb serve [--config <path>] [-f <db>] [-l <addr>] [-p <port>] [-w]
//! - tledb init [-f <db>] [--reset]
//! - tledb load [-f <db>] [--initdb] [--update] [--classified] [-q] <files>...

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// tledb - a lookup service for two-line element sets
#[derive(Parser, Debug)]
#[command(name = "tledb")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the HTTP API
    Serve {
        /// Path to a JSON configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Database file
        #[arg(short = 'f', long, value_name = "FILE")]
        database: Option<PathBuf>,

        /// Bind address
        #[arg(short = 'l', long, value_name = "ADDR")]
        listen: Option<String>,

        /// Listen port
        #[arg(short = 'p', long)]
        port: Option<u16>,

        /// Allow the add and delete routes
        #[arg(short = 'w', long)]
        writable: bool,

        /// Minimum log severity
        #[arg(long, value_name = "LEVEL")]
        log_level: Option<String>,
    },

    /// Create the database schema
    Init {
        /// Database file
        #[arg(short = 'f', long, value_name = "FILE", default_value = "tles.sqlite")]
        database: PathBuf,

        /// Drop any existing table first
        #[arg(long)]
        reset: bool,
    },

    /// Load TLE text files into the database
    Load {
        /// Database file
        #[arg(short = 'f', long, value_name = "FILE", default_value = "tles.sqlite")]
        database: PathBuf,

        /// Drop and recreate the table before loading
        #[arg(long)]
        initdb: bool,

        /// Replace records that already exist
        #[arg(long)]
        update: bool,

        /// Flag loaded records as classified
        #[arg(long)]
        classified: bool,

        /// Only report errors
        #[arg(short = 'q', long)]
        quiet: bool,

        /// TLE text files
        #[arg(required = true, value_name = "FILE")]
        files: Vec<PathBuf>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
