//! Error types for the Macro Monitor core

use thiserror::Error;

/// Core error types
///
/// Every variant is a caller-input defect; none are transient and none are
/// retried.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    #[error("Invalid macro split: {0}")]
    InvalidSplit(String),

    #[error("Out of range: {0}")]
    OutOfRange(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("No current profile selected")]
    NoCurrentProfile,

    #[error("Cannot {action} while in state {from}")]
    InvalidTransition { from: String, action: &'static str },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CoreError {
    /// Stable machine-readable code for this error kind
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::InvalidProfile(_) => "INVALID_PROFILE",
            CoreError::InvalidSplit(_) => "INVALID_SPLIT",
            CoreError::OutOfRange(_) => "OUT_OF_RANGE",
            CoreError::NotFound(_) => "NOT_FOUND",
            CoreError::NoCurrentProfile => "NO_CURRENT_PROFILE",
            CoreError::InvalidTransition { .. } => "INVALID_TRANSITION",
            CoreError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }
}

impl From<validator::ValidationErrors> for CoreError {
    fn from(errors: validator::ValidationErrors) -> Self {
        CoreError::InvalidProfile(errors.to_string())
    }
}

/// Result alias for core operations
pub type CoreResult<T> = Result<T, CoreError>;
