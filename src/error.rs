//! Structured error handling and exit codes.

use serde::Serialize;

/// Exit codes for the dupsweep binary.
///
/// Graceful cancellation (Ctrl+C observed between files) is a normal exit,
/// not an error, so only two codes exist:
/// - 0: Success (phase completed, or wound down after cancellation)
/// - 1: General error (catalog could not be opened, bad arguments, ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: the requested phase ran to completion or cancellation.
    Success = 0,
    /// General error: a fatal startup or storage failure.
    GeneralError = 1,
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
            Self::Success => "DS000",
            Self::GeneralError => "DS001",
        }
    }
}

/// Structured error information for `--json-errors` output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "DS001")
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
            message: format!("{err:#}"),
        }
    }
}
