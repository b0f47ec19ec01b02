use super::CombatEngine;
use crate::action::Action;
use crate::env::CombatEnv;
use crate::log::{LogPatch, LogPatchBuilder};
use crate::state::{CombatState, Side};

/// Result of an enemy auto-play run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AutoPlay {
    /// All enemy turns merged into one patch.
    pub patch: LogPatch,
    /// Number of synthesized actions that were resolved.
    pub steps: usize,
}

/// Resolves synthesized enemy attacks until a PC is about to act, the
/// encounter ends, or `config.autoplay_limit` steps have run.
pub fn run_enemy_turns(env: &CombatEnv<'_>, state: &mut CombatState) -> AutoPlay {
    let cap = env.config.log_cap();
    let mut merged: Option<LogPatch> = None;
    let mut steps = 0;

    while steps < env.config.autoplay_limit && state.active {
        let enemy_up = state
            .upcoming_actor()
            .is_some_and(|actor| actor.side == Side::Enemy);
        if !enemy_up {
            break;
        }

        match CombatEngine::new(state).resolve(env, &Action::attack()) {
            Ok(patch) => match merged.as_mut() {
                Some(acc) => acc.merge(patch, cap),
                None => merged = Some(patch),
            },
            Err(error) => {
                tracing::warn!(
                    target: "encounter::engine",
                    %error,
                    "enemy auto-play stopped on a rejected action"
                );
                break;
            }
        }
        steps += 1;
    }

    if steps == env.config.autoplay_limit && state.active {
        tracing::warn!(
            target: "encounter::engine",
            steps,
            "enemy auto-play hit its step limit"
        );
    }

    AutoPlay {
        patch: merged.unwrap_or_else(|| LogPatchBuilder::new(cap).build(Some(&*state))),
        steps,
    }
}
