//! Mapping of core errors to what the user sees.

use serde::Serialize;
use tracing::error;
use tubetally_core::{Error, ErrorKind};

/// Structured error report: category, message and whether a rerun may help.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error category for programmatic handling.
    pub kind: ErrorKind,
    /// Human-readable error message.
    pub message: String,
    /// Whether rerunning the command may succeed.
    pub retryable: bool,
}

impl From<&Error> for ErrorResponse {
    fn from(e: &Error) -> Self {
        Self {
            kind: e.kind(),
            message: e.to_string(),
            retryable: e.is_retryable(),
        }
    }
}

impl std::fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "error[{}]: {}", self.kind, self.message)?;
        if self.retryable {
            write!(f, " (retrying may help)")?;
        }
        Ok(())
    }
}

/// Log an error and build the report printed to stderr.
pub fn report(e: &Error) -> ErrorResponse {
    let response = ErrorResponse::from(e);
    error!(
        "Command error [kind={}, retryable={}]: {}",
        response.kind, response.retryable, e
    );
    response
}
