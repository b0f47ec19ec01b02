use strum::{AsRefStr, Display, EnumString};

use crate::state::{CombatState, Side};

/// How an encounter ended, from the party's point of view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EncounterOutcome {
    Victory,
    Defeat,
    /// The party left the fight while enemies still stood.
    Escaped,
    Draw,
}

impl EncounterOutcome {
    /// Outcome once fewer than two sides can still act; `None` while the fight goes on.
    pub fn decide(state: &CombatState) -> Option<Self> {
        let party_fled = state
            .combatants
            .values()
            .any(|c| c.side == Side::Pc && c.escaped);
        match (state.side_alive(Side::Pc), state.side_alive(Side::Enemy)) {
            (true, true) => None,
            (true, false) => Some(Self::Victory),
            (false, _) if party_fled => Some(Self::Escaped),
            (false, true) => Some(Self::Defeat),
            (false, false) => Some(Self::Draw),
        }
    }

    pub const fn announcement(self) -> &'static str {
        match self {
            Self::Victory => "Victory: all enemies are defeated.",
            Self::Defeat => "Defeat: the party has fallen.",
            Self::Escaped => "The party escapes the fight.",
            Self::Draw => "The fight ends with no one left standing.",
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};

    use super::*;
    use crate::state::Combatant;

    fn state() -> CombatState {
        let mut state = CombatState::new(0, DateTime::<Utc>::UNIX_EPOCH);
        state
            .combatants
            .insert("aria".into(), Combatant::new("aria", "Aria", Side::Pc, 12, 15, 15));
        state.add_enemy(Combatant::new("gob", "Goblin", Side::Enemy, 7, 13, 10));
        state
    }

    #[test]
    fn ongoing_fight_has_no_outcome() {
        assert_eq!(EncounterOutcome::decide(&state()), None);
    }

    #[test]
    fn remaining_side_decides() {
        let mut won = state();
        won.apply_damage("gob", 99);
        assert_eq!(EncounterOutcome::decide(&won), Some(EncounterOutcome::Victory));

        let mut lost = state();
        lost.apply_damage("aria", 99);
        assert_eq!(EncounterOutcome::decide(&lost), Some(EncounterOutcome::Defeat));

        let mut fled = state();
        fled.mark_escaped("aria");
        assert_eq!(EncounterOutcome::decide(&fled), Some(EncounterOutcome::Escaped));

        let empty = CombatState::new(0, DateTime::<Utc>::UNIX_EPOCH);
        assert_eq!(EncounterOutcome::decide(&empty), Some(EncounterOutcome::Draw));
    }

    #[test]
    fn parses_wire_names() {
        assert_eq!("victory".parse::<EncounterOutcome>().unwrap(), EncounterOutcome::Victory);
        assert_eq!("ESCAPED".parse::<EncounterOutcome>().unwrap(), EncounterOutcome::Escaped);
    }
}
