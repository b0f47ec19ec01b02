//! Weapon attack against an opponent.

use super::{ActionError, ActionTransition, RollMode};
use crate::combat::{D20Roll, DamageRoll, resolve_attack_roll};
use crate::env::{CombatEnv, RollContext};
use crate::log::{LineEvent, LineKind, LogPatchBuilder};
use crate::state::{Combatant, CombatState, TurnFlags};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttackAction {
    pub actor: String,
    /// Preferred target; ignored when that target is down or has escaped.
    pub target: Option<String>,
    pub roll_mode: RollMode,
}

impl AttackAction {
    pub fn new(actor: impl Into<String>) -> Self {
        Self {
            actor: actor.into(),
            target: None,
            roll_mode: RollMode::Normal,
        }
    }

    /// Honours the hint when it names a standing opponent, otherwise picks the
    /// first standing opponent in initiative order.
    fn select_target<'s>(&self, state: &'s CombatState, attacker: &Combatant) -> Option<&'s Combatant> {
        let opponent = attacker.side.opponent();
        let hinted = self
            .target
            .as_deref()
            .and_then(|key| state.combatant(key))
            .filter(|target| target.side == opponent && target.can_act());
        hinted.or_else(|| {
            state
                .in_order()
                .find(|candidate| candidate.side == opponent && candidate.can_act())
        })
    }
}

impl ActionTransition for AttackAction {
    fn actor(&self) -> &str {
        &self.actor
    }

    fn pre_validate(&self, state: &CombatState, _env: &CombatEnv<'_>) -> Result<(), ActionError> {
        let Some(key) = self.target.as_deref() else {
            return Ok(());
        };
        let target = state
            .combatant(key)
            .ok_or_else(|| ActionError::UnknownTarget { key: key.to_owned() })?;
        let friendly = state
            .combatant(&self.actor)
            .is_some_and(|attacker| attacker.side == target.side);
        if friendly {
            return Err(ActionError::FriendlyTarget { key: key.to_owned() });
        }
        Ok(())
    }

    fn apply(
        &self,
        state: &mut CombatState,
        env: &CombatEnv<'_>,
        log: &mut LogPatchBuilder,
    ) -> Result<(), ActionError> {
        let Some(attacker) = state.combatant(&self.actor).cloned() else {
            return Ok(());
        };
        let Some(target) = self.select_target(state, &attacker).cloned() else {
            log.mechanic(format!("{} finds no one left to attack.", attacker.name));
            return Ok(());
        };

        let mode = if target.flags.contains(TurnFlags::DODGING) {
            self.roll_mode.combine(RollMode::Disadvantage)
        } else {
            self.roll_mode
        };
        let profile = env
            .stats
            .attack_profile(&attacker)
            .unwrap_or(env.config.unarmed);

        let d20 = D20Roll::roll(
            env.rng,
            env.seed_for(state, &attacker.key, RollContext::ToHit.id()),
            env.seed_for(state, &attacker.key, RollContext::ToHitSecond.id()),
            mode,
        );
        let roll = resolve_attack_roll(d20.natural, profile.attack_bonus, target.ac);

        tracing::debug!(
            target: "encounter::engine",
            attacker = %attacker.key,
            target = %target.key,
            natural = roll.natural,
            total = roll.total,
            ac = roll.ac,
            outcome = %roll.outcome,
            "attack roll"
        );

        log.event(
            LineKind::Mechanic,
            format!("Attack: {} → {}", attacker.name, target.name),
            LineEvent::Attack {
                attacker: attacker.name.clone(),
                target: target.name.clone(),
            },
        );
        log.mechanic(format!(
            "Roll: {} {} = {} vs AC {}",
            d20.describe(),
            signed(roll.bonus),
            roll.total,
            roll.ac
        ));
        log.event(
            LineKind::Mechanic,
            format!("Result: {}", roll.outcome.label()),
            LineEvent::AttackResult {
                attacker: attacker.name.clone(),
                target: target.name.clone(),
                outcome: roll.outcome,
            },
        );
        log.mechanic(format!("Weapon: {} {}", profile.dice, profile.damage_type));

        if !roll.outcome.is_hit() {
            log.mechanic("Damage: 0 (miss)");
            return Ok(());
        }

        let damage = DamageRoll::roll(env.rng, &profile, roll.outcome.is_critical(), |index| {
            env.seed_for(state, &attacker.key, RollContext::Damage.id() + index)
        });
        log.mechanic(format!(
            "Damage: {} {} = {}",
            damage.dice_total,
            signed(damage.bonus),
            damage.total
        ));

        if let Some(change) = state.apply_damage(&target.key, damage.total) {
            log.event(
                LineKind::Mechanic,
                format!("{}: HP {}/{}", target.name, change.after, change.max),
                LineEvent::HitPoints {
                    name: target.name.clone(),
                    hp: change.after,
                    max_hp: change.max,
                },
            );
            if change.dropped_to_zero() {
                log.event(
                    LineKind::Narrative,
                    format!("{} is down.", target.name),
                    LineEvent::Down {
                        name: target.name.clone(),
                        side: target.side,
                    },
                );
            }
        }
        Ok(())
    }
}

/// Formats a modifier as `+ 5` / `- 2`.
fn signed(value: i32) -> String {
    if value < 0 {
        format!("- {}", value.unsigned_abs())
    } else {
        format!("+ {value}")
    }
}
