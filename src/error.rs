//! Domain errors
//!
//! Most command code propagates `anyhow::Error` with context. The variants
//! here are the failures callers and tests need to tell apart.

use std::path::PathBuf;
use thiserror::Error;

/// Failures raised by the helper commands
#[derive(Debug, Error)]
pub enum HelperError {
    /// A required external program is not on PATH
    #[error("Required program '{program}' was not found on PATH.\n{hint}")]
    MissingProgram { program: String, hint: String },

    /// An external program ran but exited unsuccessfully
    #[error("'{program}' exited with {status}: {stderr}")]
    CommandFailed {
        program: String,
        status: String,
        stderr: String,
    },

    /// An external program succeeded but did not produce the expected file
    #[error("Expected output was not produced: {}", .0.display())]
    OutputMissing(PathBuf),

    /// An input path does not exist
    #[error("Path does not exist: {}", .0.display())]
    NotFound(PathBuf),
}

impl HelperError {
    /// Build a `CommandFailed` from a captured command result
    pub fn command_failed(program: &str, status: Option<i32>, stderr: &str) -> Self {
        let status = match status {
            Some(code) => format!("exit code {}", code),
            None => "a signal".to_string(),
        };
        let stderr = stderr.trim();
        Self::CommandFailed {
            program: program.to_string(),
            status,
            stderr: if stderr.is_empty() {
                "(no output)".to_string()
            } else {
                stderr.to_string()
            },
        }
    }
}
