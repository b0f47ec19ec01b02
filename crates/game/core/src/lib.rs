//! Deterministic encounter rules shared by the runtime and offline tools.
//!
//! `encounter-core` owns the authoritative state of a live combat encounter and
//! exposes pure, synchronous APIs over it. Turn actions flow through
//! [`engine::CombatEngine`]; machine directives embedded in narrative text flow
//! through [`directive::DirectiveApplier`]. Both produce a [`log::LogPatch`],
//! which [`narration::extract_facts`] redacts into spoiler-safe facts.
pub mod action;
pub mod combat;
pub mod config;
pub mod directive;
pub mod engine;
pub mod env;
pub mod error;
pub mod log;
pub mod narration;
pub mod state;

pub use action::{Action, ActionError, ActionKind, ActionTransition, Modifiers, RollMode, Stance};
pub use combat::{AttackRoll, D20Roll, DamageRoll, HitOutcome};
pub use config::{BootstrapEnemy, CombatConfig};
pub use directive::{
    Directive, DirectiveApplier, DirectiveError, DirectiveOutcome, DirectiveReport,
    DirectiveSource, EnemyDescriptor, StartCause, TrustPolicy,
};
pub use engine::{AutoPlay, CombatEngine, EncounterOutcome, resolve, resolve_current, run_enemy_turns};
pub use env::{
    AttackProfile, CombatEnv, DamageType, Dice, EnemyTemplate, NoStats, PcgRng, RngOracle,
    ScriptedRng, StatsOracle,
};
pub use error::{ErrorSeverity, GameError};
pub use log::{CombatLog, LineEvent, LineKind, LogLine, LogPatch, LogPatchBuilder};
pub use narration::{FactKind, NarrationFact, extract_facts};
#[cfg(feature = "serde")]
pub use state::{CombatSnapshot, SnapshotError};
pub use state::{CombatState, Combatant, HpChange, PartyMember, Side, TurnFlags};
