//! Handlers behind each `maint` subcommand
//!
//! Each handler returns the process exit code on success. Errors carry a
//! [`MaintError`] where one applies so `main` can forward child exit codes.

use crate::cli::{Cli, Commands};
use anyhow::{bail, Context, Result};
use maintenance::config::CONFIG_FILE_NAME;
use maintenance::{
    regenerate, tidy, ExitPolicy, MaintError, ProjectConfig, SourceSetResolver, TestRunner,
};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Dispatch the parsed command line
pub fn run(cli: &Cli) -> Result<i32> {
    let mut config = load_config(cli.root.as_deref(), cli.config.as_deref())?;
    debug!(root = %config.root.display(), "Loaded configuration");

    match &cli.command {
        Commands::Tidy { strict, tool_args } => handle_tidy(&mut config, *strict, tool_args),
        Commands::Collect {
            target,
            no_diff,
            strict,
        } => handle_collect(&mut config, target.as_deref(), *no_diff, *strict),
        Commands::Test { pytest_args } => handle_test(&config, pytest_args.as_deref()),
        Commands::Sources { json, sorted } => {
            let stdout = std::io::stdout();
            handle_sources(&mut config, *json, *sorted, &mut stdout.lock())
        }
    }
}

/// Resolve the project root and load its configuration
pub fn load_config(root: Option<&Path>, config_path: Option<&Path>) -> Result<ProjectConfig> {
    let root = match root {
        Some(root) => root.to_path_buf(),
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };
    let root = std::fs::canonicalize(&root)
        .with_context(|| format!("Project root not found: {}", root.display()))?;

    let config_path: PathBuf = match config_path {
        Some(path) => {
            if !path.is_file() {
                bail!("Config file not found: {}", path.display());
            }
            path.to_path_buf()
        }
        None => root.join(CONFIG_FILE_NAME),
    };

    Ok(ProjectConfig::load_from(&root, &config_path)?)
}

pub fn handle_tidy(config: &mut ProjectConfig, strict: bool, tool_args: &[String]) -> Result<i32> {
    if strict {
        config.tidy.exit_policy = ExitPolicy::Propagate;
    }
    let result = tidy(config, tool_args)?;
    debug!(code = ?result.exit_code, "Tidy finished");
    Ok(0)
}

pub fn handle_collect(
    config: &mut ProjectConfig,
    target: Option<&Path>,
    no_diff: bool,
    strict: bool,
) -> Result<i32> {
    if let Some(target) = target {
        config.collect.target = target.to_path_buf();
    }
    if no_diff {
        config.collect.show_diff = false;
    }
    if strict {
        config.collect.exit_policy = ExitPolicy::Propagate;
    }

    let outcome = regenerate(config)?;
    info!(
        target = %outcome.target.display(),
        sources = outcome.sources,
        state = %outcome.reached,
        "Regenerated imports database"
    );
    Ok(0)
}

pub fn handle_test(config: &ProjectConfig, pytest_args: Option<&str>) -> Result<i32> {
    let overrides = pytest_args.map(split_pytest_args).transpose()?;
    Ok(TestRunner::new(config).run(overrides)?)
}

pub fn handle_sources<W: Write>(
    config: &mut ProjectConfig,
    json: bool,
    sorted: bool,
    out: &mut W,
) -> Result<i32> {
    if sorted {
        config.sources.sort = true;
    }
    let files = SourceSetResolver::new(config.sources.clone())?.resolve(&config.root)?;

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&files)?)?;
    } else {
        for path in &files {
            writeln!(out, "{}", path.display())?;
        }
    }
    Ok(0)
}

/// Split a `--pytest-args` string with shell quoting rules
pub fn split_pytest_args(args: &str) -> Result<Vec<String>> {
    shlex::split(args).with_context(|| format!("Unbalanced quoting in pytest args: {}", args))
}

/// Exit code for a failed command
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<MaintError>()
        .map(MaintError::exit_code)
        .unwrap_or(1)
}

/// Message for a failed command, with a recovery hint when one is known
pub fn error_report(err: &anyhow::Error) -> String {
    match err.downcast_ref::<MaintError>() {
        Some(maint) => maint.with_suggestion(),
        None => format!("{:#}", err),
    }
}
