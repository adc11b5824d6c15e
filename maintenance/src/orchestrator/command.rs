//! Child process invocation with optional stdout redirection

use crate::config::ExitPolicy;
use crate::error::{MaintError, MaintResult};
use crate::orchestrator::env::EnvironmentOverlay;
use crate::orchestrator::{OutputTarget, WriteMode};
use crate::source_set::SourceFileSet;
use std::ffi::OsStr;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{info, warn};

/// Runs analyzers from a fixed working directory (the project root)
pub struct CommandOrchestrator {
    working_dir: PathBuf,
}

impl CommandOrchestrator {
    pub fn new(working_dir: impl AsRef<Path>) -> Self {
        Self {
            working_dir: working_dir.as_ref().to_path_buf(),
        }
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Run `program [flags...] [files...]` and wait for it.
    ///
    /// stderr is always inherited. stdout is inherited or written into the
    /// destination of `output`; in the latter case the file has been synced by
    /// the time this returns. A non-zero exit is reported in the result, not
    /// as an error.
    pub fn run(
        &self,
        program: impl AsRef<OsStr>,
        flags: &[String],
        files: &SourceFileSet,
        env: &EnvironmentOverlay,
        output: &OutputTarget,
    ) -> MaintResult<OrchestrationResult> {
        let program = program.as_ref();
        let program_name = program.to_string_lossy().into_owned();

        let mut cmd = Command::new(program);
        cmd.args(flags)
            .args(files.to_args())
            .current_dir(&self.working_dir)
            .stdin(Stdio::inherit())
            .stderr(Stdio::inherit());
        env.apply(&mut cmd);

        let sink = match output {
            OutputTarget::Inherit => {
                cmd.stdout(Stdio::inherit());
                None
            }
            OutputTarget::File { path, mode } => {
                let (file, start) = open_destination(path, *mode)?;
                let child_end = file.try_clone().map_err(|e| MaintError::write(path, e))?;
                cmd.stdout(Stdio::from(child_end));
                Some((path.as_path(), file, start))
            }
        };

        info!(
            program = %program_name,
            flags = ?flags,
            files = files.len(),
            redirect = ?output.path(),
            "Running tool"
        );
        let status = cmd
            .status()
            .map_err(|e| MaintError::launch(&program_name, e))?;
        // Release the parent's copy of the redirected descriptor.
        drop(cmd);

        let captured = match sink {
            Some((path, file, start)) => {
                file.sync_all().map_err(|e| MaintError::write(path, e))?;
                let end = file.metadata().map_err(|e| MaintError::write(path, e))?.len();
                Some(CapturedOutput {
                    path: path.to_path_buf(),
                    bytes_written: end.saturating_sub(start),
                })
            }
            None => None,
        };

        Ok(OrchestrationResult {
            program: program_name,
            exit_code: status.code(),
            success: status.success(),
            captured,
        })
    }
}

/// Open the redirect destination; returns the file and its starting length
fn open_destination(path: &Path, mode: WriteMode) -> MaintResult<(File, u64)> {
    let mut options = OpenOptions::new();
    match mode {
        WriteMode::Truncate => options.write(true).create(true).truncate(true),
        WriteMode::Append => options.append(true).create(true),
    };
    let file = options.open(path).map_err(|e| MaintError::write(path, e))?;
    let start = match mode {
        WriteMode::Truncate => 0,
        WriteMode::Append => file.metadata().map_err(|e| MaintError::write(path, e))?.len(),
    };
    Ok((file, start))
}

/// Description of stdout captured into a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedOutput {
    pub path: PathBuf,
    /// Bytes the child added to the file
    pub bytes_written: u64,
}

/// Outcome of one orchestrated run
#[derive(Debug, Clone)]
pub struct OrchestrationResult {
    pub program: String,
    /// `None` when the child was killed by a signal
    pub exit_code: Option<i32>,
    pub success: bool,
    /// Present only when stdout was redirected
    pub captured: Option<CapturedOutput>,
}

impl OrchestrationResult {
    /// Apply the caller's policy to the exit status
    pub fn check(self, policy: ExitPolicy) -> MaintResult<Self> {
        if self.success {
            return Ok(self);
        }
        match policy {
            ExitPolicy::Ignore => {
                warn!(program = %self.program, code = ?self.exit_code, "Tool exited unsuccessfully");
                Ok(self)
            }
            ExitPolicy::Propagate => Err(MaintError::execution(&self.program, self.exit_code)),
        }
    }
}
