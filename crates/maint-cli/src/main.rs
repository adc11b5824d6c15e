//! `maint`: maintainer commands for a project checkout
//!
//! Usage:
//!   maint tidy [--strict] [-- <tool flags>...]
//!   maint collect [--target <file>] [--no-diff] [--strict]
//!   maint test [-a "<pytest args>"]
//!   maint sources [--json] [--sorted]

use clap::Parser;
use maint_cli::commands::{error_report, exit_code_for, run};
use maint_cli::{init_tracing, Cli};
use tracing::error;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let code = match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            error!("{}", error_report(&e));
            exit_code_for(&e)
        }
    };
    std::process::exit(code);
}
