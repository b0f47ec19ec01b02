use crate::env::{AttackProfile, DamageType, Dice};

/// Tunable parameters for encounter resolution and log/narration shaping.
///
/// Balance numbers live here (or in the stats oracle), never inside the
/// action handler.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CombatConfig {
    /// Maximum number of lines kept in a patch and in the session ledger.
    pub log_cap: usize,
    /// Maximum number of narration facts handed to the narrator.
    pub fact_limit: usize,
    /// Difficulty of the escape check.
    pub escape_dc: i32,
    /// Flat bonus to the escape check while dashing.
    pub dash_escape_bonus: i32,
    /// Hit points used for enemies that neither the directive nor the catalog describe.
    pub default_enemy_hp: i32,
    /// Armor class used for enemies that neither the directive nor the catalog describe.
    pub default_enemy_ac: i32,
    /// Attack profile for combatants without a weapon profile.
    pub unarmed: AttackProfile,
    /// Enemy used when a combat-like narrative bootstraps an encounter.
    pub bootstrap_enemy: BootstrapEnemy,
    /// Upper bound on synthesized enemy turns per auto-play run.
    pub autoplay_limit: usize,
}

impl CombatConfig {
    // ===== compile-time constants =====
    /// Hard ceiling for narration facts regardless of configuration.
    pub const MAX_FACTS: usize = 10;
    /// Number of characters the combat-like heuristic is allowed to inspect.
    pub const HEURISTIC_SCAN_CHARS: usize = 2_000;
    /// Upper bound on `count=` expansion in a single enemy directive.
    pub const MAX_ENEMY_COUNT: u32 = 8;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_LOG_CAP: usize = 200;
    pub const DEFAULT_ESCAPE_DC: i32 = 10;
    pub const DEFAULT_DASH_ESCAPE_BONUS: i32 = 2;
    pub const DEFAULT_ENEMY_HP: i32 = 10;
    pub const DEFAULT_ENEMY_AC: i32 = 10;
    pub const DEFAULT_AUTOPLAY_LIMIT: usize = 32;

    pub fn new() -> Self {
        Self {
            log_cap: Self::DEFAULT_LOG_CAP,
            fact_limit: Self::MAX_FACTS,
            escape_dc: Self::DEFAULT_ESCAPE_DC,
            dash_escape_bonus: Self::DEFAULT_DASH_ESCAPE_BONUS,
            default_enemy_hp: Self::DEFAULT_ENEMY_HP,
            default_enemy_ac: Self::DEFAULT_ENEMY_AC,
            unarmed: AttackProfile::new(3, Dice::new(1, 4), 2, DamageType::Bludgeoning),
            bootstrap_enemy: BootstrapEnemy::default(),
            autoplay_limit: Self::DEFAULT_AUTOPLAY_LIMIT,
        }
    }

    /// Effective fact limit, clamped to [`Self::MAX_FACTS`].
    pub fn fact_limit(&self) -> usize {
        self.fact_limit.min(Self::MAX_FACTS)
    }

    /// Effective log cap; a zero cap would drop every line, so at least one is kept.
    pub fn log_cap(&self) -> usize {
        self.log_cap.max(1)
    }
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Descriptor of the single enemy created by the bootstrap-recovery path.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BootstrapEnemy {
    pub key: String,
    pub name: String,
    pub hp: i32,
    pub ac: i32,
}

impl Default for BootstrapEnemy {
    fn default() -> Self {
        Self {
            key: "enemy_1".to_owned(),
            name: "Assailant".to_owned(),
            hp: 10,
            ac: 12,
        }
    }
}
