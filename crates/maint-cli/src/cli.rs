//! Command-line arguments for `maint`

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Maintainer commands for a project checkout
#[derive(Parser, Debug)]
#[command(name = "maint", author, version, about, long_about = None)]
pub struct Cli {
    /// Project root (defaults to the current directory)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Config file (defaults to <root>/maint.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Tidy imports in the project's own source files
    Tidy {
        /// Fail with the tool's exit status when it exits non-zero
        #[arg(long, default_value_t = false)]
        strict: bool,

        /// Extra flags for the tidy tool, placed before the file list
        #[arg(last = true)]
        tool_args: Vec<String>,
    },

    /// Regenerate the project's imports database and show what changed
    Collect {
        /// Generated file (overrides collect.target)
        #[arg(long)]
        target: Option<PathBuf>,

        /// Skip the git diff after regenerating
        #[arg(long, default_value_t = false)]
        no_diff: bool,

        /// Fail with the analyzer's exit status when it exits non-zero
        #[arg(long, default_value_t = false)]
        strict: bool,
    },

    /// Run the test suite through the external test runner
    Test {
        /// Arguments to pass to py.test, replacing the defaults
        #[arg(short = 'a', long = "pytest-args", allow_hyphen_values = true)]
        pytest_args: Option<String>,
    },

    /// Print the resolved source files
    Sources {
        /// Print a JSON array instead of one path per line
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Sort scripts and each glob's matches
        #[arg(long, default_value_t = false)]
        sorted: bool,
    },
}
