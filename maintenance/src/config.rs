//! Project configuration
//!
//! Which directories to scan, which tools to run and with which flags. The
//! defaults describe the pyflyby checkout layout; `maint.toml` at the project
//! root and `MAINT_*` environment variables override them.

use crate::error::{MaintError, MaintResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Name of the optional per-project config file
pub const CONFIG_FILE_NAME: &str = "maint.toml";

/// Header written at the top of the regenerated imports database
pub const DEFAULT_HEADER: &str = "\
# -*- python -*-
#
# This is the imports database file for pyflyby itself.
#
# To regenerate this file, run: maint collect

";

/// What to do with a discovery candidate that cannot be read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscoveryPolicy {
    /// Skip it and keep going
    #[default]
    Permissive,
    /// Fail the whole resolution
    Strict,
}

impl FromStr for DiscoveryPolicy {
    type Err = MaintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "permissive" => Ok(Self::Permissive),
            "strict" => Ok(Self::Strict),
            other => Err(MaintError::config(format!(
                "unknown discovery policy '{}' (expected permissive or strict)",
                other
            ))),
        }
    }
}

/// What to do when an orchestrated tool exits non-zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExitPolicy {
    /// Log a warning and carry on
    #[default]
    Ignore,
    /// Turn the exit status into [`MaintError::Execution`]
    Propagate,
}

impl FromStr for ExitPolicy {
    type Err = MaintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ignore" => Ok(Self::Ignore),
            "propagate" | "strict" => Ok(Self::Propagate),
            other => Err(MaintError::config(format!(
                "unknown exit policy '{}' (expected ignore or propagate)",
                other
            ))),
        }
    }
}

/// Source discovery settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSetConfig {
    /// Directory whose scripts are sniffed for a shebang, relative to root
    pub scripts_dir: PathBuf,

    /// Regex matched against the first line of each script
    pub shebang_pattern: String,

    /// Glob patterns relative to root, expanded in order
    pub globs: Vec<String>,

    /// Handling of unreadable scripts
    pub discovery_policy: DiscoveryPolicy,

    /// Drop paths already present earlier in the set
    pub dedupe: bool,

    /// Sort each group (scripts, then each glob) lexicographically
    pub sort: bool,
}

impl Default for SourceSetConfig {
    fn default() -> Self {
        Self {
            scripts_dir: PathBuf::from("bin"),
            shebang_pattern: "^#!.*python".to_string(),
            globs: vec![
                "lib/python/pyflyby/*.py".to_string(),
                "tests/*.py".to_string(),
            ],
            discovery_policy: DiscoveryPolicy::Permissive,
            dedupe: false,
            sort: false,
        }
    }
}

/// The search-path variable handed to every analyzer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchPathConfig {
    /// Environment variable name
    pub variable: String,

    /// Entries in priority order, relative to root
    pub entries: Vec<PathBuf>,
}

impl Default for SearchPathConfig {
    fn default() -> Self {
        Self {
            variable: "PYFLYBY_PATH".to_string(),
            entries: vec![PathBuf::from("etc/pyflyby"), PathBuf::from(".pyflyby")],
        }
    }
}

/// An analyzer run with inherited output (`maint tidy`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Program name (looked up on PATH) or project-relative path
    pub program: String,

    /// Static flags placed before the file list
    pub flags: Vec<String>,

    pub exit_policy: ExitPolicy,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            program: "tidy-imports".to_string(),
            flags: vec!["--uniform".to_string()],
            exit_policy: ExitPolicy::Ignore,
        }
    }
}

/// Imports database regeneration (`maint collect`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectConfig {
    /// Analyzer, resolved against the project root
    pub program: String,

    pub flags: Vec<String>,

    /// Generated file, relative to root
    pub target: PathBuf,

    /// Comment block written before the analyzer output
    pub header: String,

    pub exit_policy: ExitPolicy,

    /// Show `git diff` of the target afterwards
    pub show_diff: bool,
}

impl Default for CollectConfig {
    fn default() -> Self {
        Self {
            program: "bin/collect-imports".to_string(),
            flags: vec!["--include=pyflyby".to_string(), "--uniform".to_string()],
            target: PathBuf::from(".pyflyby"),
            header: DEFAULT_HEADER.to_string(),
            exit_policy: ExitPolicy::Ignore,
            show_diff: true,
        }
    }
}

/// External test runner (`maint test`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TestConfig {
    pub program: String,

    /// Default arguments, replaced wholesale by `--pytest-args`
    pub args: Vec<String>,

    /// Value of PYTHONPATH for the runner, relative to root
    pub python_path: PathBuf,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            program: "py.test".to_string(),
            args: vec![
                "--doctest-modules".to_string(),
                "lib".to_string(),
                "tests".to_string(),
            ],
            python_path: PathBuf::from("lib/python"),
        }
    }
}

/// Full configuration for one project checkout
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Absolute project root; never read from the config file
    #[serde(skip)]
    pub root: PathBuf,

    pub sources: SourceSetConfig,
    pub search_path: SearchPathConfig,
    pub tidy: ToolConfig,
    pub collect: CollectConfig,
    pub test: TestConfig,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self::default_for(".")
    }
}

impl ProjectConfig {
    /// Built-in defaults rooted at `root`
    pub fn default_for(root: impl AsRef<Path>) -> Self {
        Self {
            root: absolute_root(root.as_ref()),
            sources: SourceSetConfig::default(),
            search_path: SearchPathConfig::default(),
            tidy: ToolConfig::default(),
            collect: CollectConfig::default(),
            test: TestConfig::default(),
        }
    }

    /// Load `<root>/maint.toml` (if present) and apply environment overrides
    pub fn load(root: impl AsRef<Path>) -> MaintResult<Self> {
        let root = root.as_ref();
        Self::load_from(root, &root.join(CONFIG_FILE_NAME))
    }

    /// Load an explicit config file; a missing file means defaults
    pub fn load_from(root: impl AsRef<Path>, config_path: &Path) -> MaintResult<Self> {
        let mut config = if config_path.is_file() {
            let content = std::fs::read_to_string(config_path)?;
            Self::from_toml_str(root.as_ref(), &content)?
        } else {
            Self::default_for(root.as_ref())
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document; missing tables and fields keep their defaults
    pub fn from_toml_str(root: impl AsRef<Path>, content: &str) -> MaintResult<Self> {
        let mut config: ProjectConfig = toml::from_str(content)?;
        config.root = absolute_root(root.as_ref());
        Ok(config)
    }

    /// Apply `MAINT_*` overrides from `lookup` (normally the process environment)
    pub fn apply_overrides<F>(&mut self, lookup: F) -> MaintResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("MAINT_SCRIPTS_DIR") {
            self.sources.scripts_dir = PathBuf::from(dir);
        }
        if let Some(policy) = lookup("MAINT_DISCOVERY_POLICY") {
            self.sources.discovery_policy = policy.parse()?;
        }
        if let Some(policy) = lookup("MAINT_EXIT_POLICY") {
            let policy: ExitPolicy = policy.parse()?;
            self.tidy.exit_policy = policy;
            self.collect.exit_policy = policy;
        }
        if let Some(var) = lookup("MAINT_SEARCH_PATH_VAR") {
            self.search_path.variable = var;
        }
        if let Some(target) = lookup("MAINT_TARGET") {
            self.collect.target = PathBuf::from(target);
        }
        Ok(())
    }

    /// Check patterns up front so a typo fails before any tool runs
    pub fn validate(&self) -> MaintResult<()> {
        regex::Regex::new(&self.sources.shebang_pattern)
            .map_err(|e| MaintError::pattern(&self.sources.shebang_pattern, e))?;
        for pattern in &self.sources.globs {
            glob::Pattern::new(pattern).map_err(|e| MaintError::pattern(pattern, e))?;
        }
        if self.search_path.variable.is_empty() {
            return Err(MaintError::config("search path variable name is empty"));
        }
        Ok(())
    }

    /// Resolve a project-relative path against the root
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_relative() {
            self.root.join(path)
        } else {
            path.to_path_buf()
        }
    }

    /// Resolve a program name: bare names go through PATH, anything with a
    /// separator is taken relative to the root
    pub fn resolve_program(&self, program: &str) -> PathBuf {
        if program.contains(std::path::MAIN_SEPARATOR) || program.contains('/') {
            self.resolve(program)
        } else {
            PathBuf::from(program)
        }
    }

    /// Absolute location of the generated imports database
    pub fn target_path(&self) -> PathBuf {
        self.resolve(&self.collect.target)
    }

    /// Search-path entries resolved against the root, in priority order
    pub fn search_path_entries(&self) -> Vec<PathBuf> {
        self.search_path
            .entries
            .iter()
            .map(|entry| self.resolve(entry))
            .collect()
    }
}

/// Tools run with the root as their working directory, so every path handed
/// to them is built from an absolute root.
fn absolute_root(root: &Path) -> PathBuf {
    std::path::absolute(root).unwrap_or_else(|_| root.to_path_buf())
}
