//! Maintainer tooling for a Python project checkout
//!
//! This library provides:
//! - Source discovery: scripts picked by shebang plus project globs
//! - Tool orchestration: run an analyzer over those sources with a
//!   configuration search path in its environment, optionally capturing
//!   stdout into a file
//! - Regeneration of the project's imports database, followed by a git diff
//!
//! # Usage
//!
//! ```rust,ignore
//! use maintenance::{regenerate, ProjectConfig};
//!
//! let config = ProjectConfig::load("/src/pyflyby")?;
//! let outcome = regenerate(&config)?;
//! println!("{} sources, exit {:?}", outcome.sources, outcome.result.exit_code);
//! ```

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod source_set;
pub mod workflow;

#[cfg(all(test, unix))]
pub(crate) mod test_support;

pub use config::{DiscoveryPolicy, ExitPolicy, ProjectConfig};
pub use error::{MaintError, MaintResult};
pub use orchestrator::{
    CommandOrchestrator, EnvironmentOverlay, OrchestrationResult, OutputTarget,
};
pub use source_set::{SourceFileSet, SourceSetResolver};
pub use workflow::{regenerate, tidy, RegenerationState, RegenerationWorkflow, TestRunner};
