//! Helpers shared by unit tests

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Duration;

/// Write an executable script and wait until it can be exec'd.
///
/// A parallel test that forks while the file is still open for writing keeps
/// it busy (`ETXTBSY`) until that child execs. Once one exec succeeds the file
/// stays runnable.
pub(crate) fn write_executable(path: &Path, content: &str) {
    fs::write(path, content).unwrap();
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();

    for _ in 0..50 {
        let launched = Command::new(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        match launched {
            Err(e) if e.kind() == std::io::ErrorKind::ExecutableFileBusy => {
                std::thread::sleep(Duration::from_millis(10));
            }
            _ => return,
        }
    }
}
