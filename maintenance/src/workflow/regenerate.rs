//! Regeneration of the project's imports database
//!
//! ```text
//! Idle -> HeaderWritten -> ContentAppended -> DiffDisplayed -> Idle
//! ```
//!
//! The header is written and synced before the analyzer starts, so a missing
//! or failing analyzer leaves a file holding only the header. Any failure
//! before the diff stops the workflow; the diff itself is informational.

use crate::config::ProjectConfig;
use crate::error::{MaintError, MaintResult};
use crate::orchestrator::{
    CommandOrchestrator, EnvironmentOverlay, OrchestrationResult, OutputTarget,
};
use crate::source_set::SourceSetResolver;
use crate::workflow::diff::{DiffReport, GitDiff};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Where a regeneration run currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegenerationState {
    Idle,
    HeaderWritten,
    ContentAppended,
    DiffDisplayed,
}

impl std::fmt::Display for RegenerationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::HeaderWritten => "header_written",
            Self::ContentAppended => "content_appended",
            Self::DiffDisplayed => "diff_displayed",
        };
        f.write_str(name)
    }
}

/// Summary of a completed regeneration
#[derive(Debug, Clone)]
pub struct RegenerationOutcome {
    pub target: PathBuf,
    /// Number of source paths handed to the analyzer
    pub sources: usize,
    pub result: OrchestrationResult,
    /// `None` when the diff was disabled or could not be produced; present
    /// even when printing it failed
    pub diff: Option<DiffReport>,
    /// Last state reached before returning to idle
    pub reached: RegenerationState,
}

/// Rewrites the configured target from the analyzer's output
pub struct RegenerationWorkflow<'a> {
    config: &'a ProjectConfig,
    state: RegenerationState,
}

impl<'a> RegenerationWorkflow<'a> {
    pub fn new(config: &'a ProjectConfig) -> Self {
        Self {
            config,
            state: RegenerationState::Idle,
        }
    }

    /// Current state; after a failed run this is where the run stopped
    pub fn state(&self) -> RegenerationState {
        self.state
    }

    fn advance(&mut self, next: RegenerationState) {
        debug!(from = %self.state, to = %next, "Regeneration state change");
        self.state = next;
    }

    /// Regenerate and print the diff to stdout
    pub fn run(&mut self) -> MaintResult<RegenerationOutcome> {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        self.run_with_output(&mut out)
    }

    /// Regenerate, writing the diff text to `out`
    pub fn run_with_output<W: Write>(&mut self, out: &mut W) -> MaintResult<RegenerationOutcome> {
        let config = self.config;
        let resolver = SourceSetResolver::new(config.sources.clone())?;
        let files = resolver.resolve(&config.root)?;

        let target = config.target_path();
        info!(target = %target.display(), "Rewriting");
        write_header(&target, &config.collect.header)?;
        self.advance(RegenerationState::HeaderWritten);

        let env = EnvironmentOverlay::search_path(config)?;
        let program = config.resolve_program(&config.collect.program);
        let result = CommandOrchestrator::new(&config.root)
            .run(
                &program,
                &config.collect.flags,
                &files,
                &env,
                &OutputTarget::append(&target),
            )?
            .check(config.collect.exit_policy)?;
        self.advance(RegenerationState::ContentAppended);

        let diff = if config.collect.show_diff {
            match GitDiff::new(&config.root).diff_file(&target) {
                Ok(report) => {
                    match out
                        .write_all(report.text.as_bytes())
                        .and_then(|_| out.flush())
                    {
                        Ok(()) => self.advance(RegenerationState::DiffDisplayed),
                        Err(e) => warn!(error = %e, "Could not print diff of regenerated file"),
                    }
                    Some(report)
                }
                Err(e) => {
                    warn!(error = %e, "Could not show diff of regenerated file");
                    None
                }
            }
        } else {
            None
        };

        let reached = self.state;
        self.advance(RegenerationState::Idle);

        Ok(RegenerationOutcome {
            target,
            sources: files.len(),
            result,
            diff,
            reached,
        })
    }
}

/// Create or truncate `target` and persist `header` before anything else runs
fn write_header(target: &Path, header: &str) -> MaintResult<()> {
    let mut file = File::create(target).map_err(|e| MaintError::write(target, e))?;
    file.write_all(header.as_bytes())
        .and_then(|_| file.flush())
        .and_then(|_| file.sync_all())
        .map_err(|e| MaintError::write(target, e))
}

/// Regenerate the imports database described by `config`
pub fn regenerate(config: &ProjectConfig) -> MaintResult<RegenerationOutcome> {
    RegenerationWorkflow::new(config).run()
}
