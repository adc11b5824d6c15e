//! End-to-End Tests for imports database regeneration
//!
//! Runs the full workflow against a scratch git checkout with a fake
//! `bin/collect-imports` analyzer:
//! - header + analyzer output land in the target, stderr does not
//! - the diff shows the change against the committed file
//! - repeated runs are byte-identical
//! - exit-status policies and a missing analyzer

#![cfg(unix)]

use maintenance::config::{ExitPolicy, DEFAULT_HEADER};
use maintenance::{MaintError, ProjectConfig, RegenerationState, RegenerationWorkflow};
use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Duration;
use tempfile::tempdir;

/// Fake analyzer: reports its environment, flags and sorted file names
const FAKE_COLLECT_IMPORTS: &str = r##"#!/bin/sh
echo "noise on stderr" >&2
echo "# search path: $PYFLYBY_PATH"
echo "# flags: $1 $2"
shift 2
for f in "$@"; do echo "$f"; done | sed 's|.*/||' | LC_ALL=C sort | sed 's/^/import /'
"##;

fn git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("git failed to start");
    assert!(output.status.success(), "git {:?} failed", args);
}

/// Write an executable script and wait until exec stops reporting it busy
fn write_executable(path: &Path, content: &str) {
    fs::write(path, content).unwrap();
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();

    for _ in 0..50 {
        let launched = Command::new(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        match launched {
            Err(e) if e.kind() == io::ErrorKind::ExecutableFileBusy => {
                std::thread::sleep(Duration::from_millis(10));
            }
            _ => return,
        }
    }
}

/// Setup a git checkout with sources, a fake analyzer and an empty committed target
fn setup_checkout() -> (tempfile::TempDir, ProjectConfig) {
    let dir = tempdir().expect("Failed to create temp dir");
    let root = dir.path();

    fs::create_dir_all(root.join("bin")).unwrap();
    fs::create_dir_all(root.join("lib/python/pyflyby")).unwrap();
    fs::create_dir_all(root.join("tests")).unwrap();
    fs::create_dir_all(root.join("etc/pyflyby")).unwrap();

    write_executable(&root.join("bin/collect-imports"), FAKE_COLLECT_IMPORTS);
    write_executable(&root.join("bin/tidy-imports"), "#!/usr/bin/env python\n");
    fs::write(root.join("lib/python/pyflyby/_parse.py"), "").unwrap();
    fs::write(root.join("tests/test_parse.py"), "").unwrap();
    fs::write(root.join(".pyflyby"), "").unwrap();

    git(root, &["init"]);
    git(root, &["config", "user.email", "test@test.com"]);
    git(root, &["config", "user.name", "Test User"]);
    git(root, &["add", "."]);
    git(root, &["commit", "-m", "Initial commit"]);

    let config = ProjectConfig::default_for(root);
    (dir, config)
}

fn expected_content(root: &Path) -> String {
    format!(
        "{}# search path: {}:{}\n# flags: --include=pyflyby --uniform\nimport _parse.py\nimport test_parse.py\nimport tidy-imports\n",
        DEFAULT_HEADER,
        root.join("etc/pyflyby").display(),
        root.join(".pyflyby").display(),
    )
}

#[test]
fn test_regenerate_writes_header_and_output() {
    let (dir, config) = setup_checkout();

    let mut workflow = RegenerationWorkflow::new(&config);
    let mut shown = Vec::new();
    let outcome = workflow.run_with_output(&mut shown).unwrap();

    let content = fs::read_to_string(config.target_path()).unwrap();
    assert_eq!(content, expected_content(dir.path()));
    assert!(!content.contains("noise on stderr"));

    assert_eq!(outcome.sources, 3);
    assert!(outcome.result.success);
    assert_eq!(
        outcome.result.captured.as_ref().unwrap().bytes_written as usize,
        content.len() - DEFAULT_HEADER.len()
    );
    assert_eq!(outcome.reached, RegenerationState::DiffDisplayed);
    assert_eq!(workflow.state(), RegenerationState::Idle);
}

#[test]
fn test_diff_of_empty_prior_target_is_all_additions() {
    let (_dir, config) = setup_checkout();

    let mut shown = Vec::new();
    let outcome = RegenerationWorkflow::new(&config)
        .run_with_output(&mut shown)
        .unwrap();

    let diff = outcome.diff.expect("diff should be produced");
    assert!(diff.tracked);
    assert!(diff.removed_lines().is_empty());

    let content = fs::read_to_string(config.target_path()).unwrap();
    let expected: Vec<&str> = content.lines().collect();
    assert_eq!(diff.added_lines(), expected);
    assert_eq!(String::from_utf8(shown).unwrap(), diff.text);
}

#[test]
fn test_regenerate_is_idempotent() {
    let (_dir, config) = setup_checkout();

    RegenerationWorkflow::new(&config)
        .run_with_output(&mut Vec::new())
        .unwrap();
    let first = fs::read(config.target_path()).unwrap();

    RegenerationWorkflow::new(&config)
        .run_with_output(&mut Vec::new())
        .unwrap();
    let second = fs::read(config.target_path()).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_committed_regeneration_shows_no_diff() {
    let (dir, config) = setup_checkout();
    RegenerationWorkflow::new(&config)
        .run_with_output(&mut Vec::new())
        .unwrap();
    git(dir.path(), &["commit", "-am", "Regenerate imports database"]);

    let outcome = RegenerationWorkflow::new(&config)
        .run_with_output(&mut Vec::new())
        .unwrap();
    assert!(!outcome.diff.unwrap().has_changes());
}

#[test]
fn test_failing_analyzer_ignored_by_default() {
    let (_dir, mut config) = setup_checkout();
    write_executable(
        &config.resolve("bin/collect-imports"),
        "#!/bin/sh\necho partial\nexit 4\n",
    );
    config.collect.exit_policy = ExitPolicy::Ignore;

    let outcome = RegenerationWorkflow::new(&config)
        .run_with_output(&mut Vec::new())
        .unwrap();

    assert_eq!(outcome.result.exit_code, Some(4));
    assert_eq!(outcome.reached, RegenerationState::DiffDisplayed);
    assert_eq!(
        fs::read_to_string(config.target_path()).unwrap(),
        format!("{}partial\n", DEFAULT_HEADER)
    );
}

#[test]
fn test_failing_analyzer_propagated_skips_diff() {
    let (_dir, mut config) = setup_checkout();
    write_executable(
        &config.resolve("bin/collect-imports"),
        "#!/bin/sh\necho partial\nexit 4\n",
    );
    config.collect.exit_policy = ExitPolicy::Propagate;

    let mut workflow = RegenerationWorkflow::new(&config);
    let mut shown = Vec::new();
    let err = workflow.run_with_output(&mut shown).unwrap_err();

    assert!(matches!(err, MaintError::Execution { code: Some(4), .. }));
    assert_eq!(err.exit_code(), 4);
    assert_eq!(workflow.state(), RegenerationState::HeaderWritten);
    assert!(shown.is_empty());
}

#[test]
fn test_missing_analyzer_leaves_only_header() {
    let (_dir, config) = setup_checkout();
    fs::remove_file(config.resolve("bin/collect-imports")).unwrap();

    let mut workflow = RegenerationWorkflow::new(&config);
    let mut shown = Vec::new();
    let err = workflow.run_with_output(&mut shown).unwrap_err();

    assert!(matches!(err, MaintError::Launch { .. }));
    assert!(shown.is_empty());
    assert_eq!(
        fs::read_to_string(config.target_path()).unwrap(),
        DEFAULT_HEADER
    );
}

#[test]
fn test_diff_can_be_disabled() {
    let (_dir, mut config) = setup_checkout();
    config.collect.show_diff = false;

    let mut shown = Vec::new();
    let outcome = RegenerationWorkflow::new(&config)
        .run_with_output(&mut shown)
        .unwrap();

    assert!(outcome.diff.is_none());
    assert_eq!(outcome.reached, RegenerationState::ContentAppended);
    assert!(shown.is_empty());
}

#[test]
fn test_relative_root_runs_analyzer_inside_checkout() {
    // Relative to the test's working directory, like `maint --root proj`
    let dir = tempfile::Builder::new()
        .prefix("relative-root")
        .tempdir_in(".")
        .unwrap();
    let relative = Path::new(dir.path().file_name().unwrap());
    fs::create_dir_all(relative.join("bin")).unwrap();
    fs::create_dir_all(relative.join("tests")).unwrap();
    write_executable(&relative.join("bin/collect-imports"), FAKE_COLLECT_IMPORTS);
    fs::write(relative.join("tests/test_parse.py"), "").unwrap();

    let mut config = ProjectConfig::default_for(relative);
    config.collect.show_diff = false;

    let outcome = RegenerationWorkflow::new(&config)
        .run_with_output(&mut Vec::new())
        .unwrap();

    assert!(outcome.result.success);
    assert_eq!(outcome.sources, 1);
    let content = fs::read_to_string(relative.join(".pyflyby")).unwrap();
    assert!(content.starts_with(DEFAULT_HEADER));
    assert!(content.ends_with("import test_parse.py\n"));
}

/// Output that fails like a closed pipe (`maint collect | head`)
struct ClosedPipe;

impl io::Write for ClosedPipe {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
    }
}

#[test]
fn test_unprintable_diff_does_not_fail_regeneration() {
    let (dir, config) = setup_checkout();

    let outcome = RegenerationWorkflow::new(&config)
        .run_with_output(&mut ClosedPipe)
        .unwrap();

    assert!(outcome.result.success);
    assert_eq!(outcome.reached, RegenerationState::ContentAppended);
    assert!(outcome.diff.unwrap().has_changes());
    assert_eq!(
        fs::read_to_string(config.target_path()).unwrap(),
        expected_content(dir.path())
    );
}
