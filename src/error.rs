//! Structured error handling and exit codes.

use serde::Serialize;

use crate::provider::ProviderError;
use crate::session::{CallbackError, SessionError};

/// Exit codes for the tinker application.
///
/// - 0: Success
/// - 1: General error (unexpected failure)
/// - 2: Authentication failure (session could not be established or kept)
/// - 3: Configuration error (missing API key, unreadable config)
/// - 130: Interrupted by user (Ctrl+C)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: The command completed.
    Success = 0,
    /// General error: An unexpected error occurred.
    GeneralError = 1,
    /// Auth failure: No valid session could be established.
    AuthFailure = 2,
    /// Configuration error: Required settings are missing or invalid.
    ConfigError = 3,
    /// Interrupted: The command was interrupted by user (Ctrl+C).
    Interrupted = 130,
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
            Self::Success => "TK000",
            Self::GeneralError => "TK001",
            Self::AuthFailure => "TK002",
            Self::ConfigError => "TK003",
            Self::Interrupted => "TK130",
        }
    }

    /// Pick the exit code for an application error.
    #[must_use]
    pub fn for_error(err: &anyhow::Error) -> Self {
        if let Some(session_err) = err.downcast_ref::<SessionError>() {
            return match session_err {
                SessionError::MissingSecretKey { .. } => Self::ConfigError,
                SessionError::Io { .. } => Self::GeneralError,
                _ => Self::AuthFailure,
            };
        }
        let remote = match err.downcast_ref::<CallbackError>() {
            Some(CallbackError::Remote(e)) => Some(e),
            Some(CallbackError::InvalidUrl { .. }) => None,
            None => err.downcast_ref::<ProviderError>(),
        };
        if remote.is_some_and(ProviderError::is_unauthorized) {
            return Self::AuthFailure;
        }
        if err.downcast_ref::<figment::Error>().is_some() {
            return Self::ConfigError;
        }
        Self::GeneralError
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "TK002")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message, including its causes
    pub message: String,
    /// Whether the operation was interrupted
    pub interrupted: bool,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{:#}", err),
            interrupted: exit_code == ExitCode::Interrupted,
        }
    }
}
