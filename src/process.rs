//! External command execution.
//!
//! Every bootstrap step shells out to something (package managers, pip,
//! the Python interpreter), so command execution is centralized here: a
//! small builder with captured and interactive modes, plus PATH probes.
//!
//! # Usage
//!
//! ```rust,ignore
//! use capgen_setup::process::Cmd;
//!
//! let result = Cmd::new("python3")
//!     .arg("--version")
//!     .allow_fail()
//!     .run()?;
//! if result.success() {
//!     println!("{}", result.stdout.trim());
//! }
//! ```

use anyhow::{bail, Context, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Builder for external commands.
pub struct Cmd {
    program: OsString,
    args: Vec<OsString>,
    envs: Vec<(String, String)>,
    allow_fail: bool,
    error_msg: Option<String>,
}

/// Captured result of a finished command.
#[derive(Debug)]
pub struct CmdResult {
    code: Option<i32>,
    /// Captured standard output (empty in interactive mode).
    pub stdout: String,
    /// Captured standard error (empty in interactive mode).
    pub stderr: String,
}

impl CmdResult {
    /// Whether the command exited with status 0.
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Exit code, if the process exited normally.
    pub fn code(&self) -> Option<i32> {
        self.code
    }
}

impl Cmd {
    /// Start building a command. The program may be a name resolved via
    /// PATH or a full path (e.g. the venv interpreter).
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            envs: Vec::new(),
            allow_fail: false,
            error_msg: None,
        }
    }

    /// Append a single argument.
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Append a path argument.
    pub fn arg_path(mut self, path: &Path) -> Self {
        self.args.push(path.as_os_str().to_os_string());
        self
    }

    /// Set an environment variable for the child.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    /// A non-zero exit becomes a `CmdResult` instead of an error.
    pub fn allow_fail(mut self) -> Self {
        self.allow_fail = true;
        self
    }

    /// Message used when the command fails and failure is not allowed.
    pub fn error_msg(mut self, msg: impl Into<String>) -> Self {
        self.error_msg = Some(msg.into());
        self
    }

    /// Run the command, capturing stdout and stderr.
    pub fn run(self) -> Result<CmdResult> {
        tracing::debug!(program = ?self.program, args = ?self.args, "running command");

        let output = Command::new(&self.program)
            .args(&self.args)
            .envs(self.envs.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null())
            .output()
            .with_context(|| format!("failed to execute '{}'", self.program.to_string_lossy()))?;

        let result = CmdResult {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        if !result.success() && !self.allow_fail {
            let program = self.program.to_string_lossy();
            let detail = result.stderr.trim();
            match self.error_msg {
                Some(msg) if detail.is_empty() => bail!("{}", msg),
                Some(msg) => bail!("{}\n{}", msg, detail),
                None if detail.is_empty() => {
                    bail!("command failed: {} {:?}", program, self.args)
                }
                None => bail!("command failed: {} {:?}\n{}", program, self.args, detail),
            }
        }

        Ok(result)
    }

    /// Run the command with inherited stdio, so progress bars and prompts
    /// from the child (pip, package managers) reach the terminal.
    pub fn run_interactive(self) -> Result<CmdResult> {
        tracing::debug!(program = ?self.program, args = ?self.args, "running command (interactive)");

        let status = Command::new(&self.program)
            .args(&self.args)
            .envs(self.envs.iter().map(|(k, v)| (k, v)))
            .status()
            .with_context(|| format!("failed to execute '{}'", self.program.to_string_lossy()))?;

        let result = CmdResult {
            code: status.code(),
            stdout: String::new(),
            stderr: String::new(),
        };

        if !result.success() && !self.allow_fail {
            match self.error_msg {
                Some(msg) => bail!("{}", msg),
                None => bail!(
                    "command failed: {} {:?}",
                    self.program.to_string_lossy(),
                    self.args
                ),
            }
        }

        Ok(result)
    }
}

/// Find a binary in PATH, returning its full path.
pub fn which(name: &str) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    for dir in std::env::split_paths(&path_var) {
        let candidate = dir.join(name);
        if is_executable(&candidate) {
            return Some(candidate);
        }
    }
    None
}

/// Check if a binary exists in PATH.
pub fn exists(name: &str) -> bool {
    which(name).is_some()
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.is_file()
        && std::fs::metadata(path)
            .map(|m| m.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_which_existing() {
        // sh exists on any Unix system
        assert!(which("sh").is_some());
    }

    #[test]
    fn test_which_nonexistent() {
        assert!(which("definitely_not_a_real_command_12345").is_none());
    }

    #[test]
    fn test_run_captures_stdout() {
        let result = Cmd::new("echo").arg("hello").run().unwrap();
        assert!(result.success());
        assert_eq!(result.stdout.trim(), "hello");
    }

    #[test]
    fn test_run_failure_is_error() {
        let err = Cmd::new("false").run();
        assert!(err.is_err());
    }

    #[test]
    fn test_allow_fail_returns_result() {
        let result = Cmd::new("false").allow_fail().run().unwrap();
        assert!(!result.success());
    }

    #[test]
    fn test_error_msg_used_on_failure() {
        let err = Cmd::new("false").error_msg("custom failure").run();
        assert!(err.unwrap_err().to_string().contains("custom failure"));
    }

    #[test]
    fn test_env_passed_to_child() {
        let result = Cmd::new("sh")
            .args(["-c", "echo $CAPGEN_TEST_VAR"])
            .env("CAPGEN_TEST_VAR", "42")
            .run()
            .unwrap();
        assert_eq!(result.stdout.trim(), "42");
    }
}
