//! Stats oracle: read-only weapon profiles and enemy templates.
//!
//! The engine never hard-codes balance numbers. Attack profiles, escape
//! bonuses and enemy stat blocks come from a [`StatsOracle`]; anything the
//! oracle does not know falls back to [`CombatConfig`](crate::config::CombatConfig).

use std::fmt;
use std::str::FromStr;

use strum::{AsRefStr, Display, EnumString};

use crate::state::Combatant;

/// Damage type reported on the weapon line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DamageType {
    Bludgeoning,
    Piercing,
    Slashing,
    Fire,
    Cold,
    Lightning,
    Poison,
    Acid,
    Necrotic,
    Radiant,
    Force,
    Psychic,
    Thunder,
}

/// Dice expression `NdS`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dice {
    pub count: u32,
    pub sides: u32,
}

impl Dice {
    pub const fn new(count: u32, sides: u32) -> Self {
        Self { count, sides }
    }
}

impl fmt::Display for Dice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)
    }
}

/// Error returned when a dice expression cannot be parsed.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid dice expression `{0}`")]
pub struct DiceParseError(pub String);

impl FromStr for Dice {
    type Err = DiceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim().to_ascii_lowercase();
        let (count, sides) = raw
            .split_once('d')
            .ok_or_else(|| DiceParseError(s.to_owned()))?;
        let count = if count.is_empty() {
            1
        } else {
            count.parse().map_err(|_| DiceParseError(s.to_owned()))?
        };
        let sides: u32 = sides.parse().map_err(|_| DiceParseError(s.to_owned()))?;
        if count == 0 || sides == 0 {
            return Err(DiceParseError(s.to_owned()));
        }
        Ok(Self { count, sides })
    }
}

/// Everything the engine needs to resolve one attack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackProfile {
    pub attack_bonus: i32,
    pub dice: Dice,
    pub damage_bonus: i32,
    pub damage_type: DamageType,
}

impl AttackProfile {
    pub const fn new(
        attack_bonus: i32,
        dice: Dice,
        damage_bonus: i32,
        damage_type: DamageType,
    ) -> Self {
        Self {
            attack_bonus,
            dice,
            damage_bonus,
            damage_type,
        }
    }
}

/// Stat block used to fill in enemy descriptors that omit hp/ac.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnemyTemplate {
    pub name: String,
    pub hp: i32,
    pub ac: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub init_mod: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub profile: Option<String>,
}

/// Read-only source of combat numbers.
pub trait StatsOracle: Send + Sync {
    /// Attack profile for a combatant, usually keyed by its `profile` id.
    fn attack_profile(&self, combatant: &Combatant) -> Option<AttackProfile>;

    /// Bonus added to the combatant's escape check.
    fn escape_bonus(&self, _combatant: &Combatant) -> i32 {
        0
    }

    /// Enemy template looked up by profile id or display name.
    fn enemy_template(&self, id: &str) -> Option<EnemyTemplate>;
}

/// Oracle that knows nothing; every lookup falls back to configuration.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoStats;

impl StatsOracle for NoStats {
    fn attack_profile(&self, _combatant: &Combatant) -> Option<AttackProfile> {
        None
    }

    fn enemy_template(&self, _id: &str) -> Option<EnemyTemplate> {
        None
    }
}
