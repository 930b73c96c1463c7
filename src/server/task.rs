//! Task runner: shell-level task execution in the project root.
//!
//! Commands run through `sh -c` with the project root as working directory;
//! stdout/stderr are captured whole (no streaming) and optionally written
//! to a file under the root.

use std::path::Path;
use tokio::process::Command;
use tracing::{debug, info};

use crate::server::context::CommandError;

/// Captured output of a finished shell command.
#[derive(Debug)]
pub struct ExecOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Run a shell command to completion in `root`.
///
/// A non-zero exit is an error carrying the captured stderr, so the client
/// sees the diagnostic in the response message.
pub async fn run_shell(root: &Path, shell_command: &str) -> Result<ExecOutput, CommandError> {
    info!(command = %shell_command, "Executing shell command");

    let output = Command::new("sh")
        .arg("-c")
        .arg(shell_command)
        .current_dir(root)
        .output()
        .await
        .map_err(|e| CommandError::Task(format!("{}: {}", shell_command, e)))?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    if !output.status.success() {
        let code = output
            .status
            .code()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "signal".to_string());
        let mut message = format!("'{}' exited with status {}", shell_command, code);
        if !stderr.is_empty() {
            message.push_str(&format!("\nstderr: {}", stderr));
        }
        return Err(CommandError::Task(message));
    }

    debug!(
        stdout_len = stdout.len(),
        stderr_len = stderr.len(),
        "Command finished"
    );
    Ok(ExecOutput { stdout, stderr })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_captures_stdout() {
        let temp = TempDir::new().unwrap();
        let out = run_shell(temp.path(), "printf hello").await.unwrap();
        assert_eq!(out.stdout, "hello");
        assert_eq!(out.stderr, "");
    }

    #[tokio::test]
    async fn test_runs_in_root() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("marker.txt"), "x").unwrap();
        let out = run_shell(temp.path(), "ls").await.unwrap();
        assert!(out.stdout.contains("marker.txt"));
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_error_with_stderr() {
        let temp = TempDir::new().unwrap();
        let err = run_shell(temp.path(), "echo oops >&2; exit 3")
            .await
            .unwrap_err();
        match err {
            CommandError::Task(msg) => {
                assert!(msg.contains("status 3"), "got: {}", msg);
                assert!(msg.contains("oops"), "got: {}", msg);
            }
            other => panic!("Unexpected error: {:?}", other),
        }
    }
}
