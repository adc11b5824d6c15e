//! Maintainer workflows built on the source set and the orchestrator
//!
//! - `tidy`: run the tidy tool over the sources, output to the terminal
//! - `regenerate`: rewrite the imports database and show the git diff
//! - `test_runner`: hand the test roots to the external runner

pub mod diff;
pub mod regenerate;
pub mod test_runner;
pub mod tidy;

pub use diff::{DiffReport, GitDiff};
pub use regenerate::{regenerate, RegenerationOutcome, RegenerationState, RegenerationWorkflow};
pub use test_runner::TestRunner;
pub use tidy::tidy;
