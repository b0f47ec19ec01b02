//! Read-only collaborators consumed by the engine.
//!
//! [`CombatEnv`] bundles the stats oracle, the RNG oracle, the tunables and
//! the wall clock so resolution stays a pure function of its inputs.
mod rng;
mod stats;

use chrono::{DateTime, Utc};

pub use rng::{PcgRng, RngOracle, RollContext, ScriptedRng, actor_slot, compute_seed};
pub use stats::{
    AttackProfile, DamageType, Dice, DiceParseError, EnemyTemplate, NoStats, StatsOracle,
};

use crate::config::CombatConfig;
use crate::state::CombatState;

/// Aggregates the collaborators required by the engine and the directive applier.
#[derive(Clone, Copy)]
pub struct CombatEnv<'a> {
    pub stats: &'a dyn StatsOracle,
    pub rng: &'a dyn RngOracle,
    pub config: &'a CombatConfig,
    /// Timestamp stamped onto encounters started during this call.
    pub now: DateTime<Utc>,
}

impl<'a> CombatEnv<'a> {
    pub fn new(
        stats: &'a dyn StatsOracle,
        rng: &'a dyn RngOracle,
        config: &'a CombatConfig,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            stats,
            rng,
            config,
            now,
        }
    }

    /// Seed for one roll made by `key` during the current action of `state`.
    pub fn seed_for(&self, state: &CombatState, key: &str, context: u32) -> u64 {
        compute_seed(state.seed, state.nonce, actor_slot(key), context)
    }
}

impl core::fmt::Debug for CombatEnv<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CombatEnv")
            .field("config", self.config)
            .field("now", &self.now)
            .finish_non_exhaustive()
    }
}
