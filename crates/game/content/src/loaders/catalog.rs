//! Weapon / loadout / enemy catalog loader.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, bail};
use encounter_core::{AttackProfile, DamageType, Dice, EnemyTemplate};
use serde::{Deserialize, Serialize};

use crate::catalog::{ContentCatalog, Loadout};
use crate::loaders::{LoadResult, read_file};

/// Weapon entry. Dice are written as `"1d8"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeaponSpec {
    pub id: String,
    pub attack_bonus: i32,
    pub dice: String,
    #[serde(default)]
    pub damage_bonus: i32,
    pub damage_type: DamageType,
}

/// Enemy entry, keyed by `id` in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemySpec {
    pub id: String,
    pub name: String,
    pub hp: i32,
    pub ac: i32,
    #[serde(default)]
    pub init_mod: i32,
    #[serde(default)]
    pub weapon: Option<String>,
}

/// Catalog structure for RON files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub weapons: Vec<WeaponSpec>,
    #[serde(default)]
    pub loadouts: HashMap<String, Loadout>,
    #[serde(default)]
    pub enemies: Vec<EnemySpec>,
}

/// Loader for [`ContentCatalog`] from RON files.
pub struct CatalogLoader;

impl CatalogLoader {
    /// Load a catalog from a RON file.
    pub fn load(path: &Path) -> LoadResult<ContentCatalog> {
        let content = read_file(path)?;
        Self::parse(&content).with_context(|| format!("in {}", path.display()))
    }

    /// Parse and validate catalog RON text.
    pub fn parse(content: &str) -> LoadResult<ContentCatalog> {
        let file: CatalogFile = ron::from_str(content).context("Failed to parse catalog RON")?;
        Self::build(file)
    }

    /// Converts a parsed file into a catalog. Duplicate ids and unparsable
    /// dice are errors; loadouts pointing at unknown weapons are only logged.
    pub fn build(file: CatalogFile) -> LoadResult<ContentCatalog> {
        let mut catalog = ContentCatalog::new();

        for spec in file.weapons {
            if catalog.weapon(&spec.id).is_some() {
                bail!("duplicate weapon id `{}`", spec.id);
            }
            let dice: Dice = spec
                .dice
                .parse()
                .with_context(|| format!("weapon `{}`", spec.id))?;
            let profile =
                AttackProfile::new(spec.attack_bonus, dice, spec.damage_bonus, spec.damage_type);
            catalog = catalog.with_weapon(spec.id, profile);
        }

        for (id, loadout) in file.loadouts {
            catalog = catalog.with_loadout(id, loadout);
        }

        let mut seen = std::collections::HashSet::new();
        for spec in file.enemies {
            if !seen.insert(spec.id.clone()) {
                bail!("duplicate enemy id `{}`", spec.id);
            }
            let template = EnemyTemplate {
                name: spec.name,
                hp: spec.hp,
                ac: spec.ac,
                init_mod: spec.init_mod,
                profile: spec.weapon,
            };
            catalog = catalog.with_enemy(spec.id, template);
        }

        for (id, loadout) in catalog.dangling_loadouts() {
            tracing::warn!(
                target: "content::catalog",
                loadout = id,
                weapon = %loadout.weapon,
                "loadout references an unknown weapon"
            );
        }

        Ok(catalog)
    }
}
