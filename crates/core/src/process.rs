//! Process execution utilities
//!
//! Provides a unified interface for running `gradlew` and `keytool` with:
//! - Output capture
//! - Extra environment for values kept off the command line
//! - Streaming output

use crate::error::{Error, Result};
use std::ffi::OsStr;
use std::path::Path;
use std::process::{Command, Output, Stdio};

/// Result of a command execution
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Whether the command succeeded (exit code 0)
    pub success: bool,
    /// Exit code of the command
    pub exit_code: i32,
    /// Standard output
    pub stdout: String,
    /// Standard error
    pub stderr: String,
}

impl CommandResult {
    /// Create from `std::process::Output`
    pub fn from_output(output: &Output) -> Self {
        Self {
            success: output.status.success(),
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }

    /// Get combined output (stdout + stderr)
    pub fn combined_output(&self) -> String {
        if self.stderr.is_empty() {
            self.stdout.clone()
        } else if self.stdout.is_empty() {
            self.stderr.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }
}

/// Run a command with extra environment variables and capture output
///
/// For values that must not appear in the process list, such as
/// passwords handed to `keytool -storepass:env`.
pub fn run_command_with_env<S: AsRef<OsStr>>(
    program: &str,
    args: &[S],
    env: &[(String, String)],
) -> Result<CommandResult> {
    let mut cmd = Command::new(program);
    cmd.args(args).stdout(Stdio::piped()).stderr(Stdio::piped());

    for (key, value) in env {
        cmd.env(key, value);
    }

    let output = cmd.output().map_err(|e| spawn_error(program, &e))?;

    Ok(CommandResult::from_output(&output))
}

/// Run a command in a directory and stream its output (for interactive use)
pub fn run_command_streaming_in_dir<S: AsRef<OsStr>>(
    program: &str,
    args: &[S],
    dir: &Path,
) -> Result<i32> {
    let status = Command::new(program)
        .args(args)
        .current_dir(dir)
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .map_err(|e| spawn_error(program, &e))?;

    Ok(status.code().unwrap_or(-1))
}

/// Run a command in a directory with extra environment variables, streaming its output
pub fn run_command_streaming_with_env<S: AsRef<OsStr>>(
    program: &str,
    args: &[S],
    dir: &Path,
    env: &[(String, String)],
) -> Result<i32> {
    let mut cmd = Command::new(program);
    cmd.args(args)
        .current_dir(dir)
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());

    for (key, value) in env {
        cmd.env(key, value);
    }

    let status = cmd.status().map_err(|e| spawn_error(program, &e))?;

    Ok(status.code().unwrap_or(-1))
}

/// Check if a command exists in PATH
pub fn command_exists(program: &str) -> bool {
    which::which(program).is_ok()
}

fn spawn_error(program: &str, err: &std::io::Error) -> Error {
    if err.kind() == std::io::ErrorKind::NotFound {
        Error::command_not_found(program)
    } else {
        Error::process(format!("Failed to execute {program}: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[cfg(unix)]
    #[test]
    fn test_command_exists_sh() {
        assert!(command_exists("sh"));
    }

    #[test]
    fn test_command_exists_nonexistent() {
        assert!(!command_exists("nonexistent_command_12345"));
    }

    #[cfg(unix)]
    #[test]
    fn test_run_command_with_env_captures_output() {
        let env = vec![("SIGNKIT_TEST_SECRET".to_string(), "hunter2".to_string())];
        let result = run_command_with_env("sh", &["-c", "printf %s \"$SIGNKIT_TEST_SECRET\""], &env).unwrap();
        assert!(result.success);
        assert_eq!(result.stdout, "hunter2");
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_command_reports_exit_code() {
        let result = run_command_with_env("sh", &["-c", "echo oops >&2; exit 3"], &[]).unwrap();
        assert!(!result.success);
        assert_eq!(result.exit_code, 3);
        assert!(result.stderr.contains("oops"));
    }

    #[cfg(unix)]
    #[test]
    fn test_streaming_with_env_passes_variables() {
        let dir = tempfile::tempdir().unwrap();
        let env = vec![("SIGNKIT_TEST_CODE".to_string(), "7".to_string())];
        let code =
            run_command_streaming_with_env("sh", &["-c", "exit $SIGNKIT_TEST_CODE"], dir.path(), &env)
                .unwrap();
        assert_eq!(code, 7);
    }

    #[test]
    fn test_missing_program_maps_to_command_not_found() {
        let err = run_command_with_env("nonexistent_command_12345", &["--version"], &[]).unwrap_err();
        assert_eq!(err.code, ErrorCode::CommandNotFound);
    }

    #[test]
    fn test_command_result_combined_output() {
        let result = CommandResult {
            success: true,
            exit_code: 0,
            stdout: "out".to_string(),
            stderr: "err".to_string(),
        };
        assert!(result.combined_output().contains("out"));
        assert!(result.combined_output().contains("err"));
    }
}
