//! Maintenance error types
//!
//! Every fallible operation in this crate returns [`MaintResult`]. The
//! variants follow the stages of a maintainer command: discovering sources,
//! launching a tool, writing the generated file, and the informational git
//! diff at the end.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for maintenance operations
pub type MaintResult<T> = Result<T, MaintError>;

/// Errors that can occur while resolving sources or running tools
#[derive(Error, Debug)]
pub enum MaintError {
    /// A discovery candidate could not be read (strict discovery only)
    #[error("Cannot read source candidate {path}: {source}")]
    Discovery {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A glob or shebang pattern is malformed
    #[error("Invalid pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },

    /// The child program could not be started
    #[error("Failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The child program exited unsuccessfully and the caller asked to propagate it
    #[error("{program} exited with status {}", describe_code(.code))]
    Execution { program: String, code: Option<i32> },

    /// The generated file could not be opened, written or flushed
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Git operation failed
    #[error("Git operation failed: {operation} - {message}")]
    Git { operation: String, message: String },

    /// IO error wrapper
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file parse error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "signal".to_string(),
    }
}

impl MaintError {
    /// Create a discovery error
    pub fn discovery(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Discovery {
            path: path.into(),
            source,
        }
    }

    /// Create a pattern error
    pub fn pattern(pattern: impl Into<String>, message: impl ToString) -> Self {
        Self::Pattern {
            pattern: pattern.into(),
            message: message.to_string(),
        }
    }

    /// Create a launch error
    pub fn launch(program: impl Into<String>, source: std::io::Error) -> Self {
        Self::Launch {
            program: program.into(),
            source,
        }
    }

    /// Create an execution error from a child exit code
    pub fn execution(program: impl Into<String>, code: Option<i32>) -> Self {
        Self::Execution {
            program: program.into(),
            code,
        }
    }

    /// Create a write error
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a git error
    pub fn git(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Git {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Process exit code to report for this error.
    ///
    /// Execution errors forward the child's own code so that `maint` behaves
    /// like the tool it wrapped; everything else is a generic failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Execution { code: Some(code), .. } if *code != 0 => *code,
            _ => 1,
        }
    }

    /// Get recovery suggestion for this error
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            Self::Launch { source, .. } => match source.kind() {
                std::io::ErrorKind::NotFound => {
                    Some("Program not found. Check the configured path or that it is on PATH.")
                }
                std::io::ErrorKind::PermissionDenied => {
                    Some("Program is not executable. Try: chmod +x <program>")
                }
                _ => None,
            },
            Self::Write { .. } => {
                Some("Check that the target file and its directory are writable.")
            }
            Self::Config { .. } | Self::Toml(_) => {
                Some("Check maint.toml and the MAINT_* environment variables.")
            }
            Self::Git { message, .. } => {
                if message.to_lowercase().contains("not a git repository") {
                    Some("Run inside a git checkout to see diffs of regenerated files.")
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// Get error with recovery suggestion formatted
    pub fn with_suggestion(&self) -> String {
        match self.recovery_suggestion() {
            Some(suggestion) => format!("{}\n\nRecovery: {}", self, suggestion),
            None => self.to_string(),
        }
    }
}
