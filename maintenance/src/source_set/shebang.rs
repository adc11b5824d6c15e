//! Shebang sniffing for extensionless scripts

use crate::error::{MaintError, MaintResult};
use regex::Regex;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

/// A path under consideration during discovery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCandidate {
    pub path: PathBuf,
    /// Regular file after following symlinks
    pub is_file: bool,
    /// First line including its terminator; `None` for non-files
    pub first_line: Option<String>,
}

impl FileCandidate {
    /// Stat `path` and, for regular files, read its first line.
    ///
    /// A path that cannot be stat'ed (dangling symlink, vanished entry) is a
    /// non-file rather than an error. Failing to open or read an existing
    /// file is an error.
    pub fn inspect(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let is_file = std::fs::metadata(&path).map(|m| m.is_file()).unwrap_or(false);
        if !is_file {
            return Ok(Self {
                path,
                is_file,
                first_line: None,
            });
        }

        let first_line = read_first_line(&path)?;
        Ok(Self {
            path,
            is_file,
            first_line: Some(first_line),
        })
    }
}

/// Read up to and including the first `\n`; invalid UTF-8 is replaced.
fn read_first_line(path: &Path) -> io::Result<String> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut buf = Vec::new();
    reader.read_until(b'\n', &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Matches a candidate's first line against the interpreter pattern
#[derive(Debug, Clone)]
pub struct ShebangMatcher {
    pattern: Regex,
}

impl ShebangMatcher {
    pub fn new(pattern: &str) -> MaintResult<Self> {
        let pattern = Regex::new(pattern).map_err(|e| MaintError::pattern(pattern, e))?;
        Ok(Self { pattern })
    }

    pub fn matches_line(&self, line: &str) -> bool {
        self.pattern.is_match(line)
    }

    pub fn matches(&self, candidate: &FileCandidate) -> bool {
        candidate.is_file
            && candidate
                .first_line
                .as_deref()
                .is_some_and(|line| self.matches_line(line))
    }
}
