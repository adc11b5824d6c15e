//! Source Set: which files a maintainer tool should operate on
//!
//! A project's sources are found two ways:
//! - scripts in the scripts directory whose first line is a matching shebang
//! - files matched by project-relative glob patterns
//!
//! Shebang matches come first, then glob matches pattern by pattern. Within a
//! group the order is whatever the filesystem yields unless sorting is
//! configured, so callers comparing results should compare sets.

pub mod resolver;
pub mod shebang;

pub use resolver::SourceSetResolver;
pub use shebang::{FileCandidate, ShebangMatcher};

use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Ordered list of resolved source paths.
///
/// Built by [`SourceSetResolver`] and read-only afterwards. Duplicates are
/// kept unless the resolver was configured to drop them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SourceFileSet {
    paths: Vec<PathBuf>,
}

impl SourceFileSet {
    pub(crate) fn from_groups(groups: Vec<Vec<PathBuf>>, dedupe: bool) -> Self {
        let mut paths: Vec<PathBuf> = groups.into_iter().flatten().collect();
        if dedupe {
            let mut seen = HashSet::new();
            paths.retain(|p| seen.insert(p.clone()));
        }
        Self { paths }
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PathBuf> {
        self.paths.iter()
    }

    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.paths.iter().any(|p| p == path.as_ref())
    }

    /// Content of the set, ignoring order and duplicates
    pub fn to_set(&self) -> BTreeSet<PathBuf> {
        self.paths.iter().cloned().collect()
    }

    /// Trailing positional arguments for a child process
    pub fn to_args(&self) -> Vec<OsString> {
        self.paths.iter().map(|p| p.as_os_str().to_owned()).collect()
    }

    pub fn into_paths(self) -> Vec<PathBuf> {
        self.paths
    }
}

impl<'a> IntoIterator for &'a SourceFileSet {
    type Item = &'a PathBuf;
    type IntoIter = std::slice::Iter<'a, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.iter()
    }
}

impl FromIterator<PathBuf> for SourceFileSet {
    fn from_iter<I: IntoIterator<Item = PathBuf>>(iter: I) -> Self {
        Self {
            paths: iter.into_iter().collect(),
        }
    }
}
