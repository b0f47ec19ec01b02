//! d20 checks and attack-roll resolution.

use strum::{AsRefStr, Display};

use crate::action::RollMode;
use crate::env::RngOracle;

/// A d20 check, possibly rolled twice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct D20Roll {
    /// Face that counts.
    pub natural: u32,
    /// Both faces when rolled with advantage or disadvantage.
    pub pair: Option<(u32, u32)>,
    pub mode: RollMode,
}

impl D20Roll {
    /// Rolls a d20 honoring the roll mode. `second_seed` is only used when
    /// the mode requires a second die.
    pub fn roll(rng: &dyn RngOracle, seed: u64, second_seed: u64, mode: RollMode) -> Self {
        let first = rng.roll_d20(seed);
        match mode {
            RollMode::Normal => Self {
                natural: first,
                pair: None,
                mode,
            },
            RollMode::Advantage | RollMode::Disadvantage => {
                let second = rng.roll_d20(second_seed);
                let natural = if mode == RollMode::Advantage {
                    first.max(second)
                } else {
                    first.min(second)
                };
                Self {
                    natural,
                    pair: Some((first, second)),
                    mode,
                }
            }
        }
    }

    /// Renders the die part of a roll line, e.g. `d20(14)` or `d20(3, 17 adv)`.
    pub fn describe(&self) -> String {
        match (self.pair, self.mode) {
            (Some((a, b)), RollMode::Advantage) => format!("d20({a}, {b} adv)"),
            (Some((a, b)), RollMode::Disadvantage) => format!("d20({a}, {b} dis)"),
            _ => format!("d20({})", self.natural),
        }
    }
}

/// Result category of an attack roll.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum HitOutcome {
    Hit,
    Critical,
    Miss,
    /// Natural 1.
    Fumble,
}

impl HitOutcome {
    pub const fn is_hit(self) -> bool {
        matches!(self, Self::Hit | Self::Critical)
    }

    pub const fn is_critical(self) -> bool {
        matches!(self, Self::Critical)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Hit => "hit",
            Self::Critical => "critical hit",
            Self::Miss => "miss",
            Self::Fumble => "fumble",
        }
    }
}

/// Resolved attack roll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttackRoll {
    pub natural: u32,
    pub bonus: i32,
    pub total: i32,
    pub ac: i32,
    pub outcome: HitOutcome,
}

/// Natural 20 always hits as a critical, natural 1 always misses, otherwise
/// `natural + bonus >= ac` hits.
pub fn resolve_attack_roll(natural: u32, bonus: i32, ac: i32) -> AttackRoll {
    let total = natural as i32 + bonus;
    let outcome = match natural {
        20 => HitOutcome::Critical,
        1 => HitOutcome::Fumble,
        _ if total >= ac => HitOutcome::Hit,
        _ => HitOutcome::Miss,
    };
    AttackRoll {
        natural,
        bonus,
        total,
        ac,
        outcome,
    }
}
