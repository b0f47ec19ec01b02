use crate::state::CombatState;

pub const NO_COMBAT_STATUS: &str = "No active combat";
pub const ENDED_STATUS: &str = "Combat ended";

/// Status header recomputed from the encounter.
pub fn status_line(state: Option<&CombatState>) -> String {
    match state {
        None => NO_COMBAT_STATUS.to_owned(),
        Some(state) if !state.active => ENDED_STATUS.to_owned(),
        Some(state) => {
            let name = state
                .current()
                .map(|combatant| combatant.name.as_str())
                .unwrap_or("—");
            format!("⚔ Combat • Round {} • Turn: {}", state.round, name)
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};

    use super::*;
    use crate::state::{Combatant, Side};

    #[test]
    fn formats_each_lifecycle_stage() {
        assert_eq!(status_line(None), "No active combat");

        let mut state = CombatState::new(0, DateTime::<Utc>::UNIX_EPOCH);
        state.add_enemy(Combatant::new("gob", "Goblin", Side::Enemy, 7, 13, 10));
        assert_eq!(
            status_line(Some(&state)),
            "⚔ Combat • Round 1 • Turn: Goblin"
        );

        state.active = false;
        assert_eq!(status_line(Some(&state)), "Combat ended");
    }
}
