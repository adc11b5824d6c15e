//! Git diff of a regenerated file
//!
//! Shows what a regeneration changed relative to what git knows about. Files
//! git does not track are diffed against `/dev/null` so their whole content
//! shows as added.

use crate::error::{MaintError, MaintResult};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tracing::debug;

/// Rendered diff for one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffReport {
    pub path: PathBuf,
    /// Unified diff text, empty when nothing changed
    pub text: String,
    /// Whether git tracks the file
    pub tracked: bool,
}

impl DiffReport {
    pub fn has_changes(&self) -> bool {
        !self.text.trim().is_empty()
    }

    /// Content lines added by the change, without the leading `+`
    pub fn added_lines(&self) -> Vec<&str> {
        self.diff_lines('+', "+++")
    }

    /// Content lines removed by the change, without the leading `-`
    pub fn removed_lines(&self) -> Vec<&str> {
        self.diff_lines('-', "---")
    }

    fn diff_lines(&self, marker: char, header: &str) -> Vec<&str> {
        self.text
            .lines()
            .filter(|line| line.starts_with(marker) && !line.starts_with(header))
            .map(|line| &line[1..])
            .collect()
    }
}

/// Runs `git diff` from a working directory
pub struct GitDiff {
    working_dir: PathBuf,
}

impl GitDiff {
    pub fn new(working_dir: impl AsRef<Path>) -> Self {
        Self {
            working_dir: working_dir.as_ref().to_path_buf(),
        }
    }

    /// Run git and return its raw output, whatever the exit status
    fn run_git(&self, args: &[&OsStr]) -> MaintResult<Output> {
        Command::new("git")
            .args(args)
            .current_dir(&self.working_dir)
            .output()
            .map_err(|e| MaintError::git("execute", e.to_string()))
    }

    /// Whether `path` is known to git's index
    pub fn is_tracked(&self, path: &Path) -> MaintResult<bool> {
        let output = self.run_git(&[
            OsStr::new("ls-files"),
            OsStr::new("--error-unmatch"),
            OsStr::new("--"),
            path.as_os_str(),
        ])?;
        Ok(output.status.success())
    }

    /// Diff `path` against its committed version, or against nothing if untracked
    pub fn diff_file(&self, path: &Path) -> MaintResult<DiffReport> {
        let tracked = self.is_tracked(path)?;
        debug!(path = %path.display(), tracked, "Diffing regenerated file");

        let output = if tracked {
            let output = self.run_git(&[
                OsStr::new("--no-pager"),
                OsStr::new("diff"),
                OsStr::new("--no-color"),
                OsStr::new("--"),
                path.as_os_str(),
            ])?;
            if !output.status.success() {
                return Err(MaintError::git(
                    "diff",
                    String::from_utf8_lossy(&output.stderr).trim().to_string(),
                ));
            }
            output
        } else {
            let output = self.run_git(&[
                OsStr::new("--no-pager"),
                OsStr::new("diff"),
                OsStr::new("--no-index"),
                OsStr::new("--no-color"),
                OsStr::new("--"),
                OsStr::new("/dev/null"),
                path.as_os_str(),
            ])?;
            // --no-index exits 1 when the inputs differ
            if !matches!(output.status.code(), Some(0) | Some(1)) {
                return Err(MaintError::git(
                    "diff --no-index",
                    String::from_utf8_lossy(&output.stderr).trim().to_string(),
                ));
            }
            output
        };

        Ok(DiffReport {
            path: path.to_path_buf(),
            text: String::from_utf8_lossy(&output.stdout).into_owned(),
            tracked,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command;
    use tempfile::tempdir;

    fn git(dir: &Path, args: &[&str]) {
        Command::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .unwrap();
    }

    fn setup_git_repo() -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        git(dir.path(), &["init"]);
        git(dir.path(), &["config", "user.email", "test@test.com"]);
        git(dir.path(), &["config", "user.name", "Test"]);
        dir
    }

    #[test]
    fn test_report_line_helpers() {
        let report = DiffReport {
            path: PathBuf::from(".pyflyby"),
            text: "--- a/.pyflyby\n+++ b/.pyflyby\n@@ -1 +1 @@\n-import os\n+import sys\n"
                .to_string(),
            tracked: true,
        };
        assert!(report.has_changes());
        assert_eq!(report.added_lines(), vec!["import sys"]);
        assert_eq!(report.removed_lines(), vec!["import os"]);
    }

    #[test]
    fn test_tracked_file_diff() {
        let dir = setup_git_repo();
        let file = dir.path().join("db.py");
        std::fs::write(&file, "import os\n").unwrap();
        git(dir.path(), &["add", "."]);
        git(dir.path(), &["commit", "-m", "Initial commit"]);

        let differ = GitDiff::new(dir.path());
        let unchanged = differ.diff_file(&file).unwrap();
        assert!(unchanged.tracked);
        assert!(!unchanged.has_changes());

        std::fs::write(&file, "import os\nimport sys\n").unwrap();
        let changed = differ.diff_file(&file).unwrap();
        assert_eq!(changed.added_lines(), vec!["import sys"]);
        assert!(changed.removed_lines().is_empty());
    }

    #[test]
    fn test_untracked_file_shows_all_content_added() {
        let dir = setup_git_repo();
        let file = dir.path().join("new.py");
        std::fs::write(&file, "a\nb\n").unwrap();

        let report = GitDiff::new(dir.path()).diff_file(&file).unwrap();
        assert!(!report.tracked);
        assert_eq!(report.added_lines(), vec!["a", "b"]);
    }

    #[test]
    fn test_outside_repository_falls_back_to_no_index() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("plain.txt");
        std::fs::write(&file, "only line\n").unwrap();

        let report = GitDiff::new(dir.path()).diff_file(&file).unwrap();
        assert!(!report.tracked);
        assert_eq!(report.added_lines(), vec!["only line"]);
    }
}
