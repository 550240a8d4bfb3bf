//! External tool invocation
//!
//! Every command gets an explicit working directory; the process-wide
//! current directory is never changed.

use crate::error::{ZakuroError, ZakuroResult};
use std::ffi::OsStr;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

fn render<S: AsRef<OsStr>>(program: &str, args: &[S]) -> String {
    let mut line = program.to_string();
    for arg in args {
        line.push(' ');
        line.push_str(&arg.as_ref().to_string_lossy());
    }
    line
}

/// Run a command with inherited stdio, failing on non-zero exit
pub async fn run<S: AsRef<OsStr>>(program: &str, args: &[S], cwd: &Path) -> ZakuroResult<()> {
    let line = render(program, args);
    debug!("Executing in {}: {}", cwd.display(), line);

    let status = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .await
        .map_err(|e| ZakuroError::command_failed(line.clone(), e))?;

    if !status.success() {
        return Err(ZakuroError::CommandStatus {
            command: line,
            code: status.code().unwrap_or(-1),
        });
    }
    Ok(())
}

/// Run a command and return its trimmed stdout
pub async fn capture<S: AsRef<OsStr>>(
    program: &str,
    args: &[S],
    cwd: &Path,
) -> ZakuroResult<String> {
    let line = render(program, args);
    debug!("Capturing in {}: {}", cwd.display(), line);

    let output = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| ZakuroError::command_failed(line.clone(), e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ZakuroError::command_exec(line, stderr.trim()));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn run_success() {
        let dir = TempDir::new().unwrap();
        run("true", &[] as &[&str], dir.path()).await.unwrap();
    }

    #[tokio::test]
    async fn run_nonzero_exit_is_error() {
        let dir = TempDir::new().unwrap();
        let err = run("sh", &["-c", "exit 3"], dir.path()).await.unwrap_err();
        match err {
            ZakuroError::CommandStatus { code, command } => {
                assert_eq!(code, 3);
                assert_eq!(command, "sh -c exit 3");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn run_missing_program_is_error() {
        let dir = TempDir::new().unwrap();
        let err = run("zakuro-no-such-tool", &["x"], dir.path())
            .await
            .unwrap_err();
        assert!(matches!(err, ZakuroError::CommandFailed { .. }));
    }

    #[tokio::test]
    async fn capture_uses_working_directory() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "").unwrap();
        let out = capture("ls", &[] as &[&str], dir.path()).await.unwrap();
        assert_eq!(out, "marker.txt");
    }

    #[tokio::test]
    async fn capture_reports_stderr() {
        let dir = TempDir::new().unwrap();
        let err = capture("sh", &["-c", "echo oops >&2; exit 1"], dir.path())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("oops"));
    }
}
