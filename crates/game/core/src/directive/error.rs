use super::DirectiveTag;
use crate::config::CombatConfig;
use crate::error::{ErrorSeverity, GameError};

/// A single malformed directive token.
///
/// Reported per token; sibling directives in the same text are unaffected.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DirectiveError {
    #[error("@@{tag} has an unterminated argument list")]
    Unterminated { tag: DirectiveTag },

    #[error("@@{tag} argument `{key}` must be an integer, got `{value}`")]
    InvalidInteger {
        tag: DirectiveTag,
        key: String,
        value: String,
    },

    #[error("@@{tag} is missing required argument `{key}`")]
    MissingArgument {
        tag: DirectiveTag,
        key: &'static str,
    },

    #[error("unknown combat start cause `{value}`")]
    UnknownCause { value: String },

    #[error("enemy count {value} is outside 1..={max}", max = CombatConfig::MAX_ENEMY_COUNT)]
    CountOutOfRange { value: i32 },
}

impl GameError for DirectiveError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Unterminated { .. } => "DIRECTIVE_UNTERMINATED",
            Self::InvalidInteger { .. } => "DIRECTIVE_INVALID_INTEGER",
            Self::MissingArgument { .. } => "DIRECTIVE_MISSING_ARGUMENT",
            Self::UnknownCause { .. } => "DIRECTIVE_UNKNOWN_CAUSE",
            Self::CountOutOfRange { .. } => "DIRECTIVE_COUNT_OUT_OF_RANGE",
        }
    }
}
