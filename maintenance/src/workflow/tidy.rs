//! Run the tidy tool over the project's own sources with inherited output

use crate::config::ProjectConfig;
use crate::error::MaintResult;
use crate::orchestrator::{
    CommandOrchestrator, EnvironmentOverlay, OrchestrationResult, OutputTarget,
};
use crate::source_set::SourceSetResolver;

/// Resolve sources and run the configured tidy program on them.
///
/// `extra_flags` go after the configured flags and before the file list.
pub fn tidy(config: &ProjectConfig, extra_flags: &[String]) -> MaintResult<OrchestrationResult> {
    let files = SourceSetResolver::new(config.sources.clone())?.resolve(&config.root)?;
    let env = EnvironmentOverlay::search_path(config)?;

    let mut flags = config.tidy.flags.clone();
    flags.extend_from_slice(extra_flags);

    CommandOrchestrator::new(&config.root)
        .run(
            config.resolve_program(&config.tidy.program),
            &flags,
            &files,
            &env,
            &OutputTarget::Inherit,
        )?
        .check(config.tidy.exit_policy)
}
