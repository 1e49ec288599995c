//! tledb CLI entry point
//!
//! Parses arguments and dispatches through `cli::run`; any error is
//! printed to stderr and ends the process with exit status 1.

use tledb::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
