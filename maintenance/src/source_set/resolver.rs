//! Source set resolution: shebang scripts plus glob matches

use crate::config::{DiscoveryPolicy, SourceSetConfig};
use crate::error::{MaintError, MaintResult};
use crate::source_set::shebang::{FileCandidate, ShebangMatcher};
use crate::source_set::SourceFileSet;
use glob::MatchOptions;
use ignore::WalkBuilder;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Reads a scripts-directory entry for shebang matching
type Inspector = fn(&Path) -> io::Result<FileCandidate>;

/// Computes the files a maintainer tool should run over.
pub struct SourceSetResolver {
    config: SourceSetConfig,
    shebang: ShebangMatcher,
    inspect: Inspector,
}

impl SourceSetResolver {
    pub fn new(config: SourceSetConfig) -> MaintResult<Self> {
        let shebang = ShebangMatcher::new(&config.shebang_pattern)?;
        Ok(Self {
            config,
            shebang,
            inspect: |path| FileCandidate::inspect(path),
        })
    }

    #[cfg(test)]
    fn with_inspector(mut self, inspect: Inspector) -> Self {
        self.inspect = inspect;
        self
    }

    pub fn config(&self) -> &SourceSetConfig {
        &self.config
    }

    /// Resolve the source set under `root`.
    ///
    /// Returned paths are `root` joined with the project-relative location, so
    /// a relative root yields relative paths.
    pub fn resolve(&self, root: impl AsRef<Path>) -> MaintResult<SourceFileSet> {
        let root = root.as_ref();
        let mut groups = vec![self.shebang_scripts(root)?];
        for pattern in &self.config.globs {
            groups.push(self.glob_matches(root, pattern)?);
        }

        let set = SourceFileSet::from_groups(groups, self.config.dedupe);
        info!(root = %root.display(), files = set.len(), "Resolved source set");
        Ok(set)
    }

    /// Scripts directly inside the scripts directory whose first line matches
    fn shebang_scripts(&self, root: &Path) -> MaintResult<Vec<PathBuf>> {
        let scripts_dir = root.join(&self.config.scripts_dir);
        if !scripts_dir.is_dir() {
            debug!(dir = %scripts_dir.display(), "Scripts directory missing, skipping shebang scan");
            return Ok(Vec::new());
        }

        let mut builder = WalkBuilder::new(&scripts_dir);
        builder
            .max_depth(Some(1))
            .hidden(true) // like `bin/*`, dotfiles are not candidates
            .parents(false)
            .ignore(false)
            .git_ignore(false)
            .git_global(false)
            .git_exclude(false);
        if self.config.sort {
            builder.sort_by_file_name(|a, b| a.cmp(b));
        }

        let mut scripts = Vec::new();
        for entry in builder.build() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let err = e
                        .into_io_error()
                        .unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, "walk error"));
                    self.on_unreadable(&scripts_dir, err)?;
                    continue;
                }
            };
            if entry.depth() == 0 {
                continue;
            }

            let candidate = match (self.inspect)(entry.path()) {
                Ok(candidate) => candidate,
                Err(e) => {
                    self.on_unreadable(entry.path(), e)?;
                    continue;
                }
            };

            if !candidate.is_file {
                debug!(path = %candidate.path.display(), "Skipping non-file");
                continue;
            }
            if !self.shebang.matches(&candidate) {
                debug!(path = %candidate.path.display(), "Skipping script without matching shebang");
                continue;
            }
            scripts.push(candidate.path);
        }

        Ok(scripts)
    }

    /// Expand one project-relative glob pattern
    fn glob_matches(&self, root: &Path, pattern: &str) -> MaintResult<Vec<PathBuf>> {
        let root_str = root.to_string_lossy();
        let full = if root_str.is_empty() {
            pattern.to_string()
        } else {
            format!("{}/{}", glob::Pattern::escape(&root_str), pattern)
        };

        let options = MatchOptions {
            case_sensitive: true,
            require_literal_separator: true,
            require_literal_leading_dot: true,
        };
        let paths = glob::glob_with(&full, options).map_err(|e| MaintError::pattern(pattern, e))?;

        let mut matches = Vec::new();
        for entry in paths {
            match entry {
                Ok(path) => matches.push(path),
                Err(e) => {
                    let path = e.path().to_path_buf();
                    self.on_unreadable(&path, e.into())?;
                }
            }
        }

        if self.config.sort {
            matches.sort();
        }
        debug!(pattern, count = matches.len(), "Expanded glob");
        Ok(matches)
    }

    /// Apply the discovery policy to a candidate that could not be read
    fn on_unreadable(&self, path: &Path, err: io::Error) -> MaintResult<()> {
        match self.config.discovery_policy {
            DiscoveryPolicy::Permissive => {
                warn!(path = %path.display(), error = %err, "Skipping unreadable source candidate");
                Ok(())
            }
            DiscoveryPolicy::Strict => Err(MaintError::discovery(path, err)),
        }
    }
}
