//! External program lookup and execution

use anyhow::{Context, Result};
use std::env;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

use crate::error::HelperError;

/// Captured result of a finished child process
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Exit code, `None` if terminated by a signal
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Locate an executable on PATH
///
/// Names containing a path separator are checked as given.
pub fn find_program(name: &str) -> Option<PathBuf> {
    if name.contains(std::path::MAIN_SEPARATOR) {
        let path = PathBuf::from(name);
        return is_executable(&path).then_some(path);
    }

    let path_var = env::var_os("PATH")?;
    env::split_paths(&path_var)
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
}

/// Locate an executable on PATH or fail with a remediation hint
pub fn require_program(name: &str, hint: &str) -> Result<PathBuf, HelperError> {
    match find_program(name) {
        Some(path) => {
            debug!(program = name, path = %path.display(), "found program");
            Ok(path)
        }
        None => Err(HelperError::MissingProgram {
            program: name.to_string(),
            hint: hint.to_string(),
        }),
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Run a program to completion and capture its output
///
/// A non-zero exit is returned as data; only a failure to spawn is an error.
pub fn run<I, S>(program: &str, args: I) -> Result<CommandOutput>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let args: Vec<_> = args.into_iter().map(|a| a.as_ref().to_owned()).collect();
    debug!(program, ?args, "running command");

    let output = Command::new(program)
        .args(&args)
        .stdin(Stdio::null())
        .output()
        .with_context(|| format!("Failed to run: {}", program))?;

    let result = CommandOutput {
        status: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    };
    debug!(program, status = ?result.status, "command finished");
    Ok(result)
}

/// Run a program and fail unless it exits with status 0
pub fn run_checked<I, S>(program: &str, args: I) -> Result<CommandOutput>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let output = run(program, args)?;
    if !output.success() {
        return Err(HelperError::command_failed(program, output.status, &output.stderr).into());
    }
    Ok(output)
}

/// Check whether a process with this exact name is running
pub fn is_process_running(name: &str) -> bool {
    run("pgrep", ["-x", name])
        .map(|o| o.success())
        .unwrap_or(false)
}

/// Send SIGTERM to every process with this exact name
///
/// Returns `false` when no process matched.
pub fn kill_process(name: &str) -> Result<bool> {
    let output = run("pkill", ["-x", name])?;
    match output.status {
        Some(0) => Ok(true),
        Some(1) => Ok(false),
        status => Err(HelperError::command_failed("pkill", status, &output.stderr).into()),
    }
}
