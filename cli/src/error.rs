//! CLI error handling
//!
//! Classifies core and host errors into a stable error code, a process exit
//! code and a JSON error body for the caller.

use macro_monitor_shared::CoreError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Exit code for bad input (validation failures, bad argument combinations)
pub const EXIT_INVALID_INPUT: u8 = 2;
/// Exit code when a referenced profile does not exist
pub const EXIT_NOT_FOUND: u8 = 3;
/// Exit code when an operation needs a current profile and there is none
pub const EXIT_NO_PROFILE: u8 = 4;
/// Exit code for storage or other internal failures
pub const EXIT_INTERNAL: u8 = 1;

/// CLI error type that can be converted to an exit code and error body
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl CliError {
    pub fn code(&self) -> &'static str {
        match self {
            CliError::Core(err) => err.code(),
            CliError::BadRequest(_) => "BAD_REQUEST",
            CliError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Core(err) => match err {
                CoreError::InvalidProfile(_)
                | CoreError::InvalidSplit(_)
                | CoreError::OutOfRange(_)
                | CoreError::InvalidTransition { .. } => EXIT_INVALID_INPUT,
                CoreError::NotFound(_) => EXIT_NOT_FOUND,
                CoreError::NoCurrentProfile => EXIT_NO_PROFILE,
                CoreError::Serialization(_) => EXIT_INTERNAL,
            },
            CliError::BadRequest(_) => EXIT_INVALID_INPUT,
            CliError::Internal(_) => EXIT_INTERNAL,
        }
    }

    /// Build the JSON error body, logging internal failures in full
    pub fn to_response(&self) -> ErrorResponse {
        let message = match self {
            CliError::Internal(err) => {
                error!("Internal error: {:?}", err);
                format!("An internal error occurred: {:#}", err)
            }
            other => other.to_string(),
        };

        ErrorResponse {
            error: ErrorDetail {
                code: self.code().to_string(),
                message,
            },
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::Internal(err.into())
    }
}

/// Result type alias for command handlers
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(CoreError::InvalidProfile("x".into()), "INVALID_PROFILE", EXIT_INVALID_INPUT)]
    #[case(CoreError::InvalidSplit("x".into()), "INVALID_SPLIT", EXIT_INVALID_INPUT)]
    #[case(CoreError::OutOfRange("x".into()), "OUT_OF_RANGE", EXIT_INVALID_INPUT)]
    #[case(CoreError::NotFound("x".into()), "NOT_FOUND", EXIT_NOT_FOUND)]
    #[case(CoreError::NoCurrentProfile, "NO_CURRENT_PROFILE", EXIT_NO_PROFILE)]
    fn test_core_error_classification(
        #[case] err: CoreError,
        #[case] code: &str,
        #[case] exit: u8,
    ) {
        let err = CliError::from(err);
        assert_eq!(err.code(), code);
        assert_eq!(err.exit_code(), exit);
    }

    #[test]
    fn test_response_body() {
        let err = CliError::from(CoreError::NotFound("Profile 42".into()));
        let body = serde_json::to_value(err.to_response()).unwrap();
        assert_eq!(body["error"]["code"], "NOT_FOUND");
        assert_eq!(body["error"]["message"], "Not found: Profile 42");
    }

    #[test]
    fn test_internal_error() {
        let err = CliError::from(anyhow::anyhow!("disk full"));
        assert_eq!(err.exit_code(), EXIT_INTERNAL);
        assert!(err.to_response().error.message.contains("disk full"));
    }
}
