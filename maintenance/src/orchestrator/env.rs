//! Environment overlay for child processes

use crate::config::ProjectConfig;
use crate::error::{MaintError, MaintResult};
use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::path::PathBuf;
use std::process::Command;

/// Variables layered on top of the inherited parent environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentOverlay {
    vars: BTreeMap<String, OsString>,
}

impl EnvironmentOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overlay carrying the project's configuration search path
    pub fn search_path(config: &ProjectConfig) -> MaintResult<Self> {
        let mut overlay = Self::new();
        overlay.set_path_list(&config.search_path.variable, &config.search_path_entries())?;
        Ok(overlay)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<OsString>) -> &mut Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    /// Set `name` to `entries` joined with the platform path separator
    /// (`:` on Unix), earlier entries first.
    pub fn set_path_list(&mut self, name: &str, entries: &[PathBuf]) -> MaintResult<&mut Self> {
        let joined = std::env::join_paths(entries).map_err(|e| {
            MaintError::config(format!("cannot build {} from {:?}: {}", name, entries, e))
        })?;
        Ok(self.set(name, joined))
    }

    pub fn get(&self, name: &str) -> Option<&OsStr> {
        self.vars.get(name).map(|v| v.as_os_str())
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OsStr)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_os_str()))
    }

    /// Add the overlay to `cmd`; everything else is inherited.
    pub fn apply(&self, cmd: &mut Command) {
        cmd.envs(self.vars.iter());
    }
}
