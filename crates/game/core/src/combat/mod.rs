//! Combat resolution primitives.
//!
//! Pure functions over rolls: no state access, no logging. Actions call these
//! and record the results.
//!
//! - `D20Roll`: one d20 check, with advantage/disadvantage
//! - `resolve_attack_roll`: natural 20 / natural 1 / total vs AC
//! - `DamageRoll`: weapon dice plus flat bonus, doubled dice on a critical

pub mod damage;
pub mod hit;

pub use damage::DamageRoll;
pub use hit::{AttackRoll, D20Roll, HitOutcome, resolve_attack_roll};
