//! Dodge / Dash / Disengage / Use Object.

use strum::{AsRefStr, Display};

use super::{ActionError, ActionKind, ActionTransition};
use crate::env::CombatEnv;
use crate::log::{LineEvent, LineKind, LogPatchBuilder};
use crate::state::{CombatState, TurnFlags};

/// Turn-long posture set by a non-attack action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Stance {
    Dodge,
    Dash,
    Disengage,
    UseObject,
}

impl Stance {
    pub const fn from_kind(kind: ActionKind) -> Option<Self> {
        match kind {
            ActionKind::Dodge => Some(Self::Dodge),
            ActionKind::Dash => Some(Self::Dash),
            ActionKind::Disengage => Some(Self::Disengage),
            ActionKind::UseObject => Some(Self::UseObject),
            _ => None,
        }
    }

    pub const fn flag(self) -> TurnFlags {
        match self {
            Self::Dodge => TurnFlags::DODGING,
            Self::Dash => TurnFlags::DASHING,
            Self::Disengage => TurnFlags::DISENGAGING,
            Self::UseObject => TurnFlags::USING_OBJECT,
        }
    }

    fn describe(self, name: &str) -> String {
        match self {
            Self::Dodge => format!("{name} takes the Dodge action."),
            Self::Dash => format!("{name} dashes."),
            Self::Disengage => format!("{name} disengages."),
            Self::UseObject => format!("{name} uses an object."),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StanceAction {
    pub actor: String,
    pub stance: Stance,
}

impl StanceAction {
    pub fn new(actor: impl Into<String>, stance: Stance) -> Self {
        Self {
            actor: actor.into(),
            stance,
        }
    }
}

impl ActionTransition for StanceAction {
    fn actor(&self) -> &str {
        &self.actor
    }

    fn apply(
        &self,
        state: &mut CombatState,
        _env: &CombatEnv<'_>,
        log: &mut LogPatchBuilder,
    ) -> Result<(), ActionError> {
        let Some(combatant) = state.combatant_mut(&self.actor) else {
            return Ok(());
        };
        combatant.flags.insert(self.stance.flag());
        let name = combatant.name.clone();
        log.event(
            LineKind::Mechanic,
            self.stance.describe(&name),
            LineEvent::Stance {
                name,
                stance: self.stance,
            },
        );
        Ok(())
    }
}
