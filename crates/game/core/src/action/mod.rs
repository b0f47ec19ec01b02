//! Turn actions.
//!
//! - `ActionKind`: every command a combatant can issue on its turn
//! - `Action`: an execution request (kind + optional actor hint + modifiers)
//! - `ActionTransition`: how a concrete action validates and mutates state
//!
//! Handlers live in `attack`, `stance` and `escape`; `available` answers the
//! read-only `help` command. The engine owns ordering, auto-skip and commit.

mod attack;
mod available;
pub mod error;
mod escape;
mod stance;

use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

pub use attack::AttackAction;
pub use available::{available_actions, help_lines};
pub use error::ActionError;
pub use escape::EscapeAction;
pub use stance::{Stance, StanceAction};

use crate::env::CombatEnv;
use crate::log::LogPatchBuilder;
use crate::state::CombatState;

/// Defines how a concrete action variant mutates the encounter.
///
/// `apply` runs on a working copy owned by the engine; an error discards the
/// copy so a rejected action never leaves partial mutations behind.
pub trait ActionTransition {
    /// Combatant performing the action.
    fn actor(&self) -> &str;

    /// Validates pre-conditions using the state **before** mutation.
    fn pre_validate(&self, _state: &CombatState, _env: &CombatEnv<'_>) -> Result<(), ActionError> {
        Ok(())
    }

    /// Applies the action and records its log lines.
    fn apply(
        &self,
        state: &mut CombatState,
        env: &CombatEnv<'_>,
        log: &mut LogPatchBuilder,
    ) -> Result<(), ActionError>;
}

/// Every command a combatant may issue on its turn.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, EnumIter, AsRefStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ActionKind {
    Attack,
    EndTurn,
    Dodge,
    Dash,
    Disengage,
    UseObject,
    Escape,
    Help,
}

impl ActionKind {
    /// Parses a command name such as `attack`, `end_turn` or `combat_dodge`.
    pub fn parse(name: &str) -> Result<Self, ActionError> {
        let trimmed = name.trim();
        let lowered = trimmed.to_ascii_lowercase().replace(['-', ' '], "_");
        let bare = lowered.strip_prefix("combat_").unwrap_or(&lowered);
        bare.parse().map_err(|_| ActionError::UnknownAction {
            name: trimmed.to_owned(),
        })
    }

    pub fn all() -> impl Iterator<Item = Self> {
        Self::iter()
    }

    /// Whether the action accepts an advantage/disadvantage roll mode.
    pub const fn accepts_roll_mode(self) -> bool {
        matches!(self, Self::Attack | Self::Escape)
    }

    /// Whether the action accepts a target hint.
    pub const fn accepts_target(self) -> bool {
        matches!(self, Self::Attack)
    }

    /// Whether the action consumes the acting combatant's turn.
    pub const fn consumes_turn(self) -> bool {
        !matches!(self, Self::Help)
    }
}

/// How a d20 check is rolled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RollMode {
    #[default]
    Normal,
    #[strum(to_string = "advantage", serialize = "adv")]
    Advantage,
    #[strum(to_string = "disadvantage", serialize = "dis")]
    Disadvantage,
}

impl RollMode {
    pub fn parse(value: &str) -> Result<Self, ActionError> {
        value.trim().parse().map_err(|_| ActionError::UnknownRollMode {
            value: value.trim().to_owned(),
        })
    }

    /// Combines two sources; advantage and disadvantage cancel out.
    pub fn combine(self, other: Self) -> Self {
        use RollMode::*;
        match (self, other) {
            (Normal, mode) | (mode, Normal) => mode,
            (Advantage, Advantage) => Advantage,
            (Disadvantage, Disadvantage) => Disadvantage,
            (Advantage, Disadvantage) | (Disadvantage, Advantage) => Normal,
        }
    }
}

/// Optional request modifiers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Modifiers {
    #[cfg_attr(feature = "serde", serde(default))]
    pub roll_mode: RollMode,
    #[cfg_attr(feature = "serde", serde(default))]
    pub target: Option<String>,
}

impl Modifiers {
    /// Rejects modifiers the given action does not accept.
    pub fn validate_for(&self, kind: ActionKind) -> Result<(), ActionError> {
        if self.roll_mode != RollMode::Normal && !kind.accepts_roll_mode() {
            return Err(ActionError::ModifierNotAllowed {
                kind,
                modifier: "roll_mode",
            });
        }
        if self.target.is_some() && !kind.accepts_target() {
            return Err(ActionError::ModifierNotAllowed {
                kind,
                modifier: "target",
            });
        }
        Ok(())
    }
}

/// A turn action request.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Action {
    pub kind: ActionKind,
    /// When set, must name the combatant that holds the turn after auto-skip.
    #[cfg_attr(feature = "serde", serde(default))]
    pub actor: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub modifiers: Modifiers,
}

impl Action {
    pub fn new(kind: ActionKind) -> Self {
        Self {
            kind,
            actor: None,
            modifiers: Modifiers::default(),
        }
    }

    /// Parses a bare command name into an action without modifiers.
    pub fn parse(name: &str) -> Result<Self, ActionError> {
        ActionKind::parse(name).map(Self::new)
    }

    pub fn attack() -> Self {
        Self::new(ActionKind::Attack)
    }

    pub fn end_turn() -> Self {
        Self::new(ActionKind::EndTurn)
    }

    #[must_use]
    pub fn by(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    #[must_use]
    pub fn targeting(mut self, target: impl Into<String>) -> Self {
        self.modifiers.target = Some(target.into());
        self
    }

    #[must_use]
    pub fn with_roll_mode(mut self, roll_mode: RollMode) -> Self {
        self.modifiers.roll_mode = roll_mode;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_command_names_with_prefix() {
        assert_eq!(ActionKind::parse("attack").unwrap(), ActionKind::Attack);
        assert_eq!(ActionKind::parse("combat_end_turn").unwrap(), ActionKind::EndTurn);
        assert_eq!(ActionKind::parse("Use-Object").unwrap(), ActionKind::UseObject);
        assert_eq!(
            ActionKind::parse("fireball"),
            Err(ActionError::UnknownAction {
                name: "fireball".into()
            })
        );
    }

    #[test]
    fn roll_modes_cancel() {
        assert_eq!(RollMode::Advantage.combine(RollMode::Disadvantage), RollMode::Normal);
        assert_eq!(RollMode::Normal.combine(RollMode::Disadvantage), RollMode::Disadvantage);
        assert_eq!(RollMode::parse("adv").unwrap(), RollMode::Advantage);
        assert!(RollMode::parse("sideways").is_err());
    }

    #[test]
    fn modifiers_only_where_accepted() {
        let target = Modifiers {
            target: Some("goblin".into()),
            ..Default::default()
        };
        assert!(target.validate_for(ActionKind::Attack).is_ok());
        assert!(target.validate_for(ActionKind::Escape).is_err());

        let advantage = Modifiers {
            roll_mode: RollMode::Advantage,
            target: None,
        };
        assert!(advantage.validate_for(ActionKind::Escape).is_ok());
        assert_eq!(
            advantage.validate_for(ActionKind::Dodge),
            Err(ActionError::ModifierNotAllowed {
                kind: ActionKind::Dodge,
                modifier: "roll_mode"
            })
        );
    }
}
