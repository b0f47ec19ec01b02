//! Action validation errors.
//!
//! Only malformed or impossible requests end up here. A rejected action never
//! mutates the encounter.

use crate::error::{ErrorSeverity, GameError};

use super::ActionKind;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    /// Command name does not map to any action.
    #[error("unknown action `{name}`")]
    UnknownAction { name: String },

    /// A modifier was supplied to an action that does not take it.
    #[error("{kind} does not accept the `{modifier}` modifier")]
    ModifierNotAllowed {
        kind: ActionKind,
        modifier: &'static str,
    },

    /// Roll mode string is not one of normal/advantage/disadvantage.
    #[error("unknown roll mode `{value}`")]
    UnknownRollMode { value: String },

    /// Target hint names no combatant of this encounter.
    #[error("unknown target `{key}`")]
    UnknownTarget { key: String },

    /// Target hint names a combatant on the actor's own side.
    #[error("`{key}` is an ally of the acting combatant")]
    FriendlyTarget { key: String },

    /// Actor hint does not match the combatant holding the turn.
    #[error("it is not `{actor}`'s turn")]
    NotActorsTurn {
        actor: String,
        expected: Option<String>,
    },
}

impl GameError for ActionError {
    fn severity(&self) -> ErrorSeverity {
        use ActionError::*;
        match self {
            NotActorsTurn { .. } => ErrorSeverity::Recoverable,
            UnknownAction { .. }
            | ModifierNotAllowed { .. }
            | UnknownRollMode { .. }
            | UnknownTarget { .. }
            | FriendlyTarget { .. } => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        use ActionError::*;
        match self {
            UnknownAction { .. } => "ACTION_UNKNOWN",
            ModifierNotAllowed { .. } => "ACTION_MODIFIER_NOT_ALLOWED",
            UnknownRollMode { .. } => "ACTION_UNKNOWN_ROLL_MODE",
            UnknownTarget { .. } => "ACTION_UNKNOWN_TARGET",
            FriendlyTarget { .. } => "ACTION_FRIENDLY_TARGET",
            NotActorsTurn { .. } => "ACTION_NOT_ACTORS_TURN",
        }
    }
}
