//! Command Orchestrator: runs an external analyzer over a source set
//!
//! ```text
//! SourceFileSet ─┐
//! Environment ───┼─> <program> [flags...] <file>... ─> stdout: inherited | file
//! OutputTarget ──┘                                    stderr: inherited
//! ```
//!
//! Calls block until the child exits. The exit status is reported, never
//! judged here; callers apply an [`ExitPolicy`](crate::config::ExitPolicy).

pub mod command;
pub mod env;

pub use command::{CapturedOutput, CommandOrchestrator, OrchestrationResult};
pub use env::EnvironmentOverlay;

use std::path::{Path, PathBuf};

/// How an existing destination file is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Truncate,
    Append,
}

/// Where child standard output goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Child shares the parent's stdout
    Inherit,
    /// Child stdout is written into `path`
    File { path: PathBuf, mode: WriteMode },
}

impl OutputTarget {
    pub fn truncate(path: impl AsRef<Path>) -> Self {
        Self::File {
            path: path.as_ref().to_path_buf(),
            mode: WriteMode::Truncate,
        }
    }

    pub fn append(path: impl AsRef<Path>) -> Self {
        Self::File {
            path: path.as_ref().to_path_buf(),
            mode: WriteMode::Append,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Inherit => None,
            Self::File { path, .. } => Some(path),
        }
    }
}
