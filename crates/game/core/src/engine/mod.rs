//! Action resolution pipeline.
//!
//! [`CombatEngine`] is the single entry point that mutates an encounter in
//! response to a turn action. Every call runs the same steps:
//!
//! 1. reject malformed modifiers (no mutation)
//! 2. answer `help` read-only, or return a no-op patch without an encounter
//! 3. on a working copy: auto-skip, force-terminate when a side is gone,
//!    validate the actor hint, apply the action, then end or advance
//! 4. commit the working copy and bump the nonce
//!
//! A validation error at any point discards the working copy.

mod driver;
mod outcome;
mod turns;

pub use driver::{AutoPlay, run_enemy_turns};
pub use outcome::EncounterOutcome;

use crate::action::{
    Action, ActionError, ActionKind, ActionTransition, AttackAction, EscapeAction, Stance,
    StanceAction, help_lines,
};
use crate::env::CombatEnv;
use crate::log::{LogPatch, LogPatchBuilder, NO_COMBAT_STATUS};
use crate::state::CombatState;

/// Resolves turn actions against one encounter.
pub struct CombatEngine<'a> {
    state: &'a mut CombatState,
}

impl<'a> CombatEngine<'a> {
    pub fn new(state: &'a mut CombatState) -> Self {
        Self { state }
    }

    /// Resolves one action. On error the encounter is left untouched.
    pub fn resolve(&mut self, env: &CombatEnv<'_>, action: &Action) -> Result<LogPatch, ActionError> {
        action.modifiers.validate_for(action.kind)?;

        if !action.kind.consumes_turn() {
            let mut log = LogPatchBuilder::new(env.config.log_cap());
            for line in help_lines(Some(&*self.state)) {
                log.narrative(line);
            }
            return Ok(log.build(Some(&*self.state)));
        }

        if !self.state.active {
            return Ok(inactive_patch(env));
        }

        let mut working = self.state.clone();
        let mut log = LogPatchBuilder::new(env.config.log_cap());
        CombatEngine::new(&mut working).run(env, action, &mut log)?;
        working.nonce += 1;
        *self.state = working;

        Ok(log.build(Some(&*self.state)))
    }

    fn run(
        &mut self,
        env: &CombatEnv<'_>,
        action: &Action,
        log: &mut LogPatchBuilder,
    ) -> Result<(), ActionError> {
        self.auto_skip(log);

        if let Some(outcome) = EncounterOutcome::decide(self.state) {
            self.finish(Some(outcome), log);
            return Ok(());
        }

        let Some(actor) = self.state.current().map(|c| c.key.clone()) else {
            return Ok(());
        };
        if let Some(hint) = action.actor.as_deref()
            && hint != actor
        {
            return Err(ActionError::NotActorsTurn {
                actor: hint.to_owned(),
                expected: Some(actor),
            });
        }

        match action.kind {
            ActionKind::Attack => {
                let attack = AttackAction {
                    actor,
                    target: action.modifiers.target.clone(),
                    roll_mode: action.modifiers.roll_mode,
                };
                self.execute(&attack, env, log)?;
            }
            ActionKind::Escape => {
                let escape = EscapeAction {
                    actor,
                    roll_mode: action.modifiers.roll_mode,
                };
                self.execute(&escape, env, log)?;
            }
            ActionKind::EndTurn => {
                if let Some(current) = self.state.current() {
                    log.mechanic(format!("{} ends the turn.", current.name));
                }
            }
            kind => {
                if let Some(stance) = Stance::from_kind(kind) {
                    self.execute(&StanceAction::new(actor, stance), env, log)?;
                }
            }
        }

        match EncounterOutcome::decide(self.state) {
            Some(outcome) => self.finish(Some(outcome), log),
            None => self.advance_turn(log),
        }
        Ok(())
    }

    fn execute(
        &mut self,
        action: &impl ActionTransition,
        env: &CombatEnv<'_>,
        log: &mut LogPatchBuilder,
    ) -> Result<(), ActionError> {
        let holder = self.state.current_key();
        if holder != Some(action.actor()) {
            return Err(ActionError::NotActorsTurn {
                actor: action.actor().to_owned(),
                expected: holder.map(str::to_owned),
            });
        }
        action.pre_validate(self.state, env)?;
        action.apply(self.state, env, log)
    }
}

/// Resolves one action against a copy of `state`, returning the patch and the
/// resulting state. The input is never modified.
pub fn resolve(
    env: &CombatEnv<'_>,
    action: &Action,
    state: &CombatState,
) -> Result<(LogPatch, CombatState), ActionError> {
    let mut next = state.clone();
    let patch = CombatEngine::new(&mut next).resolve(env, action)?;
    Ok((patch, next))
}

/// Like [`resolve`], for a session that may have no encounter at all.
///
/// Without an encounter `help` lists the only available command and every
/// other action yields the "No active combat" no-op patch.
pub fn resolve_current(
    env: &CombatEnv<'_>,
    action: &Action,
    state: Option<&CombatState>,
) -> Result<(LogPatch, Option<CombatState>), ActionError> {
    match state {
        Some(state) => resolve(env, action, state).map(|(patch, next)| (patch, Some(next))),
        None => {
            action.modifiers.validate_for(action.kind)?;
            let patch = if !action.kind.consumes_turn() {
                let mut log = LogPatchBuilder::new(env.config.log_cap());
                for line in help_lines(None) {
                    log.narrative(line);
                }
                log.build(None)
            } else {
                inactive_patch(env)
            };
            Ok((patch, None))
        }
    }
}

fn inactive_patch(env: &CombatEnv<'_>) -> LogPatch {
    let mut log = LogPatchBuilder::new(env.config.log_cap());
    log.set_status(NO_COMBAT_STATUS);
    log.set_open(false);
    log.build(None)
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};

    use super::*;
    use crate::config::CombatConfig;
    use crate::env::{NoStats, ScriptedRng};
    use crate::state::{Combatant, PartyMember, Side};

    fn duel() -> CombatState {
        let mut state = CombatState::new(5, DateTime::<Utc>::UNIX_EPOCH);
        state.upsert_pc(&PartyMember {
            key: "aria".into(),
            name: "Aria".into(),
            hp: 12,
            max_hp: 12,
            ac: 15,
            initiative: 15,
            profile: None,
        });
        state.add_enemy(Combatant::new("goblin", "Goblin", Side::Enemy, 7, 13, 10));
        state
    }

    #[test]
    fn help_is_read_only() {
        let config = CombatConfig::default();
        let rng = ScriptedRng::default();
        let env = CombatEnv::new(&NoStats, &rng, &config, DateTime::<Utc>::UNIX_EPOCH);
        let state = duel();

        let (patch, next) = resolve(&env, &Action::new(ActionKind::Help), &state).unwrap();
        assert_eq!(next, state);
        assert!(patch.lines[0].text.starts_with("Commands:"));
    }

    #[test]
    fn inactive_encounter_is_a_noop() {
        let config = CombatConfig::default();
        let rng = ScriptedRng::default();
        let env = CombatEnv::new(&NoStats, &rng, &config, DateTime::<Utc>::UNIX_EPOCH);
        let mut state = duel();
        state.active = false;

        let (patch, next) = resolve(&env, &Action::attack(), &state).unwrap();
        assert_eq!(patch.status, "No active combat");
        assert!(patch.lines.is_empty());
        assert!(!patch.open);
        assert_eq!(next, state);
    }

    #[test]
    fn validation_error_leaves_state_untouched() {
        let config = CombatConfig::default();
        let rng = ScriptedRng::default();
        let env = CombatEnv::new(&NoStats, &rng, &config, DateTime::<Utc>::UNIX_EPOCH);
        let mut state = duel();
        state.upsert_pc(&PartyMember {
            key: "bram".into(),
            name: "Bram".into(),
            hp: 10,
            max_hp: 10,
            ac: 12,
            initiative: 12,
            profile: None,
        });
        state.apply_damage("aria", 99);
        let before = state.clone();

        // auto-skip would move the turn to bram, but the hint names aria
        let err = CombatEngine::new(&mut state)
            .resolve(&env, &Action::attack().by("aria"))
            .unwrap_err();
        assert_eq!(
            err,
            ActionError::NotActorsTurn {
                actor: "aria".into(),
                expected: Some("bram".into())
            }
        );
        assert_eq!(state, before);
    }

    #[test]
    fn transitions_only_run_for_the_turn_holder() {
        let config = CombatConfig::default();
        let rng = ScriptedRng::default();
        let env = CombatEnv::new(&NoStats, &rng, &config, DateTime::<Utc>::UNIX_EPOCH);
        let mut state = duel();
        let before = state.clone();
        let mut log = LogPatchBuilder::new(20);

        let err = CombatEngine::new(&mut state)
            .execute(&StanceAction::new("goblin", Stance::Dodge), &env, &mut log)
            .unwrap_err();
        assert_eq!(
            err,
            ActionError::NotActorsTurn {
                actor: "goblin".into(),
                expected: Some("aria".into())
            }
        );
        assert_eq!(state, before);
        assert!(log.lines().is_empty());
    }

    #[test]
    fn no_encounter_answers_help_and_noops() {
        let config = CombatConfig::default();
        let rng = ScriptedRng::default();
        let env = CombatEnv::new(&NoStats, &rng, &config, DateTime::<Utc>::UNIX_EPOCH);

        let (help, state) = resolve_current(&env, &Action::new(ActionKind::Help), None).unwrap();
        assert_eq!(state, None);
        assert_eq!(help.lines[0].text, "Commands: help");

        let (noop, _) = resolve_current(&env, &Action::attack(), None).unwrap();
        assert_eq!(noop.status, "No active combat");
        assert!(resolve_current(&env, &Action::new(ActionKind::Dash).targeting("x"), None).is_err());
    }

    #[test]
    fn modifiers_on_stance_are_rejected() {
        let config = CombatConfig::default();
        let rng = ScriptedRng::default();
        let env = CombatEnv::new(&NoStats, &rng, &config, DateTime::<Utc>::UNIX_EPOCH);
        let state = duel();

        let action = Action::new(ActionKind::Dodge).targeting("goblin");
        assert!(matches!(
            resolve(&env, &action, &state),
            Err(ActionError::ModifierNotAllowed { .. })
        ));
    }

    #[test]
    fn stance_sets_flag_and_passes_turn() {
        let config = CombatConfig::default();
        let rng = ScriptedRng::default();
        let env = CombatEnv::new(&NoStats, &rng, &config, DateTime::<Utc>::UNIX_EPOCH);
        let state = duel();

        let (patch, next) = resolve(&env, &Action::new(ActionKind::Dodge), &state).unwrap();
        assert!(next.combatant("aria").unwrap().flags.contains(crate::state::TurnFlags::DODGING));
        assert_eq!(next.current_key(), Some("goblin"));
        assert_eq!(next.nonce, 1);
        assert_eq!(patch.status, "⚔ Combat • Round 1 • Turn: Goblin");
    }
}
