use super::{CombatEngine, EncounterOutcome};
use crate::log::{LineEvent, LineKind, LogPatchBuilder};

/// Turn bookkeeping for CombatEngine.
impl<'a> CombatEngine<'a> {
    /// Moves the turn on to the next combatant able to act. Logs a separator
    /// for each new round, a skip line for everyone passed over and the name
    /// of the combatant who now holds the turn.
    pub(crate) fn advance_turn(&mut self, log: &mut LogPatchBuilder) {
        self.step(log);
        self.skip_unable(log);
        self.announce_holder(log);
    }

    /// Skips combatants that cannot act, announcing the new holder if any
    /// turn was skipped.
    pub(crate) fn auto_skip(&mut self, log: &mut LogPatchBuilder) {
        if self.skip_unable(log) {
            self.announce_holder(log);
        }
    }

    fn step(&mut self, log: &mut LogPatchBuilder) {
        let step = self.state.advance();
        if step.wrapped {
            log.separator(step.round);
        }
    }

    /// Bounded by `len(order) + 1` steps so it terminates even when everyone
    /// is down. Returns whether any turn was skipped.
    fn skip_unable(&mut self, log: &mut LogPatchBuilder) -> bool {
        let limit = self.state.order.len() + 1;
        let mut skipped = false;
        for _ in 0..limit {
            let Some(current) = self.state.current() else {
                break;
            };
            if current.can_act() {
                break;
            }
            let name = current.name.clone();
            let reason = if current.escaped { "escaped" } else { "down" };
            tracing::debug!(
                target: "encounter::engine",
                combatant = %current.key,
                reason,
                "skipping turn"
            );
            log.event(
                LineKind::Mechanic,
                format!("Turn skipped: {name} ({reason})."),
                LineEvent::Skip { name },
            );
            self.step(log);
            skipped = true;
        }
        skipped
    }

    fn announce_holder(&self, log: &mut LogPatchBuilder) {
        if let Some(holder) = self.state.current().filter(|c| c.can_act()) {
            log.status(format!("Turn passes to: {}", holder.name));
        }
    }

    /// Ends the encounter. The state stays readable with `active = false`.
    pub(crate) fn finish(&mut self, outcome: Option<EncounterOutcome>, log: &mut LogPatchBuilder) {
        self.state.active = false;
        if let Some(outcome) = outcome {
            log.narrative(outcome.announcement());
        }
        log.event(
            LineKind::Status,
            "Combat ended.",
            LineEvent::EncounterEnded { outcome },
        );
        tracing::info!(
            target: "encounter::engine",
            outcome = ?outcome,
            round = self.state.round,
            "encounter ended"
        );
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};

    use super::*;
    use crate::state::{CombatState, Combatant, Side};

    fn state() -> CombatState {
        let mut state = CombatState::new(0, DateTime::<Utc>::UNIX_EPOCH);
        for (key, name, side, init) in [
            ("aria", "Aria", Side::Pc, 15),
            ("bob", "Bob", Side::Pc, 12),
            ("gob", "Goblin", Side::Enemy, 10),
        ] {
            state
                .combatants
                .insert(key.into(), Combatant::new(key, name, side, 10, 10, init));
        }
        state.rebuild_order();
        state
    }

    #[test]
    fn auto_skip_passes_over_down_combatants() {
        let mut state = state();
        state.advance();
        state.apply_damage("bob", 99);
        let mut log = LogPatchBuilder::new(20);

        CombatEngine::new(&mut state).auto_skip(&mut log);
        assert_eq!(state.current_key(), Some("gob"));
        let texts: Vec<_> = log.lines().iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, ["Turn skipped: Bob (down).", "Turn passes to: Goblin"]);
    }

    #[test]
    fn auto_skip_terminates_when_everyone_is_down() {
        let mut state = state();
        for key in ["aria", "bob", "gob"] {
            state.apply_damage(key, 99);
        }
        let mut log = LogPatchBuilder::new(50);

        CombatEngine::new(&mut state).auto_skip(&mut log);
        let skips = log
            .lines()
            .iter()
            .filter(|l| matches!(l.event, Some(LineEvent::Skip { .. })))
            .count();
        assert_eq!(skips, 4);
        assert!(state.turn_index < state.order.len());
    }

    #[test]
    fn wrapping_logs_round_separator() {
        let mut state = state();
        state.advance();
        state.advance();
        let mut log = LogPatchBuilder::new(20);

        CombatEngine::new(&mut state).advance_turn(&mut log);
        assert_eq!(state.round, 2);
        assert_eq!(log.lines()[0].text, "--- Round 2 ---");
        assert_eq!(log.lines()[1].text, "Turn passes to: Aria");
    }

    #[test]
    fn advance_never_hands_the_turn_to_someone_down() {
        let mut state = state();
        state.apply_damage("bob", 99);
        let mut log = LogPatchBuilder::new(20);

        CombatEngine::new(&mut state).advance_turn(&mut log);
        assert_eq!(state.current_key(), Some("gob"));
        let texts: Vec<_> = log.lines().iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, ["Turn skipped: Bob (down).", "Turn passes to: Goblin"]);
    }
}
