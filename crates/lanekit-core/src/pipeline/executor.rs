//! Script execution.
//!
//! Provides the trait actions use to shell out and a bash-based
//! implementation.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use crate::error::Result;

/// Captured result of a script run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptOutput {
    /// Exit code of the process (0 = success, -1 = killed by a signal).
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ScriptOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Runs shell scripts for actions.
#[async_trait]
pub trait ScriptRunner: Send + Sync {
    /// Runs `script` in `working_dir`.
    ///
    /// `args` are exposed to the script as `$1`, `$2`, ... and are never
    /// interpolated into the script text.
    async fn run(&self, working_dir: &Path, script: &str, args: &[String]) -> Result<ScriptOutput>;
}

/// Executes scripts with `/bin/bash -c` on the host.
#[derive(Debug, Clone)]
pub struct ShellRunner {
    shell: PathBuf,
}

impl ShellRunner {
    pub fn new() -> Self {
        Self::with_shell("/bin/bash")
    }

    pub fn with_shell(shell: impl Into<PathBuf>) -> Self {
        Self {
            shell: shell.into(),
        }
    }
}

impl Default for ShellRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ScriptRunner for ShellRunner {
    async fn run(&self, working_dir: &Path, script: &str, args: &[String]) -> Result<ScriptOutput> {
        tracing::debug!("Running script in {}: {}", working_dir.display(), script);

        // The word after the script becomes $0.
        let output = Command::new(&self.shell)
            .arg("-c")
            .arg(script)
            .arg("lanekit")
            .args(args)
            .current_dir(working_dir)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        Ok(ScriptOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_shell_runner_passes_positional_args() {
        let dir = tempfile::tempdir().unwrap();
        let output = ShellRunner::new()
            .run(
                dir.path(),
                r#"printf '%s|%s' "$1" "$2""#,
                &["one two".to_string(), "$(whoami)".to_string()],
            )
            .await
            .unwrap();

        assert!(output.success());
        assert_eq!(output.stdout, "one two|$(whoami)");
    }

    #[tokio::test]
    async fn test_shell_runner_uses_working_dir() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("marker.txt"), "here")
            .await
            .unwrap();

        let output = ShellRunner::new()
            .run(dir.path(), "cat marker.txt", &[])
            .await
            .unwrap();
        assert_eq!(output.stdout, "here");
    }

    #[tokio::test]
    async fn test_shell_runner_reports_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let output = ShellRunner::new()
            .run(dir.path(), "echo boom >&2; exit 3", &[])
            .await
            .unwrap();

        assert!(!output.success());
        assert_eq!(output.exit_code, 3);
        assert_eq!(output.stderr.trim(), "boom");
    }

    #[tokio::test]
    async fn test_shell_runner_missing_dir_is_io_error() {
        let result = ShellRunner::new()
            .run(Path::new("/nonexistent/lanekit"), "true", &[])
            .await;
        assert!(result.is_err());
    }
}
