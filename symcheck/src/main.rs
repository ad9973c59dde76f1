//! # symcheck
//!
//! Validates `//libnickel` symbol annotations in a C/C++ source tree against
//! the firmware releases they claim to support.
//!
//! ## Usage
//!
//! ```bash
//! # Check the current directory against the published firmware dumps
//! symcheck
//!
//! # Use a local mirror of the dump archives
//! symcheck --archive-dir ~/kobo-dumps src/
//!
//! # List what would be checked without fetching anything
//! symcheck --dry-run src/
//!
//! # Write a JSON summary alongside the console report
//! symcheck -o symcheck.json src/
//! ```
//!
//! Exits 0 when every evaluated check found at least one of its symbols,
//! 1 on any failed check or fatal error.

mod cli;
mod config;
mod output;
mod runner;

use clap::Parser;

use cli::Cli;
use config::RunConfig;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version also arrive here
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_level()))
        .format_timestamp(None)
        .init();

    let github_env = std::env::var("GITHUB_ACTIONS").ok();
    let exit_code = match RunConfig::from_cli(cli, github_env.as_deref()) {
        Ok(config) => match runner::run_checks(&config) {
            Ok(code) => code,
            Err(e) => {
                eprintln!("error: {}", e);
                1
            }
        },
        Err(e) => {
            eprintln!("error: {}", e);
            1
        }
    };

    std::process::exit(exit_code);
}
