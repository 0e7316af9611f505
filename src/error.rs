//! Engine-level error taxonomy and CLI exit codes.

use serde::Serialize;

use crate::scanner::ScanError;

/// Errors surfaced by the caller-facing engine API.
///
/// Only root-validity and invalid-argument failures propagate as operation
/// errors; per-file and per-subtree problems are absorbed into counters and
/// logs inside the operations themselves.
#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    /// Another operation is already running. Requests are rejected, not queued.
    #[error("engine is busy with another operation")]
    Busy,

    /// No project has been loaded yet.
    #[error("no project loaded")]
    NoProject,

    /// The scan root was invalid or inaccessible.
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// A caller supplied an invalid argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Exit codes for the corposcan CLI.
///
/// - 0: Success (operation completed normally)
/// - 1: General error (unexpected failure)
/// - 2: Invalid root (path missing or not a directory)
/// - 3: Partial success (completed with some non-fatal per-file errors)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: the requested operation completed normally.
    Success = 0,
    /// General error: an unexpected error occurred.
    GeneralError = 1,
    /// Invalid root: the scan root does not exist or is not a directory.
    InvalidRoot = 2,
    /// Partial success: completed but some files could not be read.
    PartialSuccess = 3,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "CS000",
            Self::GeneralError => "CS001",
            Self::InvalidRoot => "CS002",
            Self::PartialSuccess => "CS003",
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "CS001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message
    pub message: String,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_values() {
        assert_eq!(ExitCode::Success.as_i32(), 0);
        assert_eq!(ExitCode::GeneralError.as_i32(), 1);
        assert_eq!(ExitCode::InvalidRoot.as_i32(), 2);
        assert_eq!(ExitCode::PartialSuccess.as_i32(), 3);
    }

    #[test]
    fn test_exit_code_prefixes() {
        assert_eq!(ExitCode::Success.code_prefix(), "CS000");
        assert_eq!(ExitCode::InvalidRoot.code_prefix(), "CS002");
    }

    #[test]
    fn test_engine_error_display() {
        assert_eq!(
            EngineError::Busy.to_string(),
            "engine is busy with another operation"
        );
        assert_eq!(
            EngineError::InvalidArgument("bad method".into()).to_string(),
            "invalid argument: bad method"
        );
    }

    #[test]
    fn test_structured_error() {
        let err = anyhow::anyhow!("something failed");
        let s = StructuredError::new(&err, ExitCode::GeneralError);
        assert_eq!(s.code, "CS001");
        assert_eq!(s.exit_code, 1);
        assert_eq!(s.message, "something failed");
    }
}
