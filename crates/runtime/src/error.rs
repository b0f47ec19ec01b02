//! Unified error type surfaced by the session service.
//!
//! Expected game conditions never reach this type; they come back as a
//! regular patch. Only rejected requests and configuration problems do.

use encounter_core::{ActionError, ErrorSeverity, GameError};
use thiserror::Error;

pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The action was rejected before any mutation.
    #[error(transparent)]
    Action(#[from] ActionError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("invalid value {value:?} for {key}")]
    InvalidConfig { key: &'static str, value: String },

    #[error("session id {0:?} is empty or contains unsupported characters")]
    InvalidSessionId(String),
}

impl GameError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Action(error) => error.severity(),
            Self::InvalidConfig { .. } | Self::InvalidSessionId(_) => ErrorSeverity::Validation,
            Self::Repository(_) => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Action(error) => error.error_code(),
            Self::Repository(_) => "RUNTIME_REPOSITORY",
            Self::InvalidConfig { .. } => "RUNTIME_INVALID_CONFIG",
            Self::InvalidSessionId(_) => "RUNTIME_INVALID_SESSION_ID",
        }
    }
}
