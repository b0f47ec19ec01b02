//! Attempt to leave the fight.

use super::{ActionError, ActionTransition, RollMode};
use crate::combat::D20Roll;
use crate::env::{CombatEnv, RollContext};
use crate::log::{LineEvent, LineKind, LogPatchBuilder};
use crate::state::{CombatState, TurnFlags};

/// `d20 + escape bonus >= escape DC`. Disengaging grants advantage and
/// dashing adds the configured dash bonus.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EscapeAction {
    pub actor: String,
    pub roll_mode: RollMode,
}

impl EscapeAction {
    pub fn new(actor: impl Into<String>) -> Self {
        Self {
            actor: actor.into(),
            roll_mode: RollMode::Normal,
        }
    }
}

impl ActionTransition for EscapeAction {
    fn actor(&self) -> &str {
        &self.actor
    }

    fn apply(
        &self,
        state: &mut CombatState,
        env: &CombatEnv<'_>,
        log: &mut LogPatchBuilder,
    ) -> Result<(), ActionError> {
        let Some(runner) = state.combatant(&self.actor).cloned() else {
            return Ok(());
        };

        let mut bonus = env.stats.escape_bonus(&runner);
        if runner.flags.contains(TurnFlags::DASHING) {
            bonus += env.config.dash_escape_bonus;
        }
        let mode = if runner.flags.contains(TurnFlags::DISENGAGING) {
            self.roll_mode.combine(RollMode::Advantage)
        } else {
            self.roll_mode
        };

        let d20 = D20Roll::roll(
            env.rng,
            env.seed_for(state, &runner.key, RollContext::Escape.id()),
            env.seed_for(state, &runner.key, RollContext::EscapeSecond.id()),
            mode,
        );
        let total = d20.natural as i32 + bonus;
        let dc = env.config.escape_dc;
        let success = total >= dc;

        tracing::debug!(
            target: "encounter::engine",
            actor = %runner.key,
            natural = d20.natural,
            total,
            dc,
            success,
            "escape check"
        );

        let sign = if bonus < 0 { '-' } else { '+' };
        log.mechanic(format!(
            "Escape: {} {sign} {} = {total} vs DC {dc}",
            d20.describe(),
            bonus.unsigned_abs()
        ));
        let text = if success {
            state.mark_escaped(&runner.key);
            format!("{} escapes the fight.", runner.name)
        } else {
            format!("{} fails to escape.", runner.name)
        };
        log.event(
            LineKind::Narrative,
            text,
            LineEvent::Escape {
                name: runner.name,
                success,
            },
        );
        Ok(())
    }
}
