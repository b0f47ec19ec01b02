//! Engine configuration loader.

use std::path::Path;

use anyhow::Context;
use encounter_core::CombatConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for [`CombatConfig`] from TOML files.
///
/// Missing keys keep their defaults, so a partial file is valid.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    pub fn load(path: &Path) -> LoadResult<CombatConfig> {
        let content = read_file(path)?;
        Self::parse(&content).with_context(|| format!("in {}", path.display()))
    }

    /// Parse config data from TOML text.
    pub fn parse(content: &str) -> LoadResult<CombatConfig> {
        let config: CombatConfig =
            toml::from_str(content).context("Failed to parse combat config TOML")?;
        if config.fact_limit > CombatConfig::MAX_FACTS {
            tracing::warn!(
                target: "content::config",
                requested = config.fact_limit,
                max = CombatConfig::MAX_FACTS,
                "fact limit above the hard ceiling; it will be clamped"
            );
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = ConfigLoader::parse("escape_dc = 14\nlog_cap = 50\n").unwrap();
        assert_eq!(config.escape_dc, 14);
        assert_eq!(config.log_cap, 50);
        assert_eq!(config.default_enemy_hp, CombatConfig::DEFAULT_ENEMY_HP);
    }

    #[test]
    fn nested_tables_override_profiles() {
        let text = r#"
            [unarmed]
            attack_bonus = 1
            dice = { count = 1, sides = 2 }
            damage_bonus = 0
            damage_type = "bludgeoning"

            [bootstrap_enemy]
            key = "bandit"
            name = "Bandit"
            hp = 9
            ac = 11
        "#;
        let config = ConfigLoader::parse(text).unwrap();
        assert_eq!(config.unarmed.attack_bonus, 1);
        assert_eq!(config.bootstrap_enemy.name, "Bandit");
    }

    #[test]
    fn rejects_wrong_types() {
        assert!(ConfigLoader::parse("escape_dc = \"hard\"").is_err());
    }
}
