//! External test runner entry point
//!
//! Forwards the test-discovery roots to the runner with the project's
//! library directory on PYTHONPATH; the runner's exit code is the result.

use crate::config::ProjectConfig;
use crate::error::MaintResult;
use crate::orchestrator::{CommandOrchestrator, EnvironmentOverlay, OutputTarget};
use crate::source_set::SourceFileSet;
use std::path::PathBuf;
use tracing::info;

pub struct TestRunner<'a> {
    config: &'a ProjectConfig,
}

impl<'a> TestRunner<'a> {
    pub fn new(config: &'a ProjectConfig) -> Self {
        Self { config }
    }

    /// Arguments for the runner: the override when given, else the defaults
    pub fn args(&self, overrides: Option<Vec<String>>) -> Vec<String> {
        overrides.unwrap_or_else(|| self.config.test.args.clone())
    }

    pub fn python_path(&self) -> PathBuf {
        self.config.resolve(&self.config.test.python_path)
    }

    /// Run the tests and return the runner's exit code (1 if killed by a signal)
    pub fn run(&self, overrides: Option<Vec<String>>) -> MaintResult<i32> {
        let args = self.args(overrides);
        let mut env = EnvironmentOverlay::new();
        env.set("PYTHONPATH", self.python_path());

        let result = CommandOrchestrator::new(&self.config.root).run(
            self.config.resolve_program(&self.config.test.program),
            &args,
            &SourceFileSet::default(),
            &env,
            &OutputTarget::Inherit,
        )?;

        let code = result.exit_code.unwrap_or(1);
        info!(program = %result.program, code, "Test run finished");
        Ok(code)
    }
}
