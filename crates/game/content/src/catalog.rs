//! In-memory weapon, loadout and enemy catalog.

use std::collections::HashMap;

use encounter_core::{AttackProfile, Combatant, EnemyTemplate, StatsOracle};

/// Equipment attached to a combatant profile id.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Loadout {
    /// Weapon id in the catalog.
    pub weapon: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub escape_bonus: i32,
}

/// Read-only stats collaborator backed by content files.
///
/// A combatant's `profile` is resolved first as a loadout, then as a bare
/// weapon id. Enemy templates are found by id, then by case-insensitive name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContentCatalog {
    weapons: HashMap<String, AttackProfile>,
    loadouts: HashMap<String, Loadout>,
    enemies: HashMap<String, EnemyTemplate>,
}

impl ContentCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_weapon(mut self, id: impl Into<String>, profile: AttackProfile) -> Self {
        self.weapons.insert(id.into(), profile);
        self
    }

    #[must_use]
    pub fn with_loadout(mut self, id: impl Into<String>, loadout: Loadout) -> Self {
        self.loadouts.insert(id.into(), loadout);
        self
    }

    #[must_use]
    pub fn with_enemy(mut self, id: impl Into<String>, template: EnemyTemplate) -> Self {
        self.enemies.insert(id.into(), template);
        self
    }

    pub fn weapon(&self, id: &str) -> Option<&AttackProfile> {
        self.weapons.get(id)
    }

    pub fn loadout(&self, id: &str) -> Option<&Loadout> {
        self.loadouts.get(id)
    }

    pub fn weapon_count(&self) -> usize {
        self.weapons.len()
    }

    pub fn enemy_count(&self) -> usize {
        self.enemies.len()
    }

    /// Loadouts whose weapon id is missing from the catalog.
    pub fn dangling_loadouts(&self) -> impl Iterator<Item = (&str, &Loadout)> {
        self.loadouts
            .iter()
            .filter(|(_, loadout)| !self.weapons.contains_key(&loadout.weapon))
            .map(|(id, loadout)| (id.as_str(), loadout))
    }
}

impl StatsOracle for ContentCatalog {
    fn attack_profile(&self, combatant: &Combatant) -> Option<AttackProfile> {
        let id = combatant.profile.as_deref()?;
        match self.loadouts.get(id) {
            Some(loadout) => self.weapons.get(&loadout.weapon).copied(),
            None => self.weapons.get(id).copied(),
        }
    }

    fn escape_bonus(&self, combatant: &Combatant) -> i32 {
        combatant
            .profile
            .as_deref()
            .and_then(|id| self.loadouts.get(id))
            .map_or(0, |loadout| loadout.escape_bonus)
    }

    fn enemy_template(&self, id: &str) -> Option<EnemyTemplate> {
        self.enemies
            .get(id)
            .or_else(|| {
                self.enemies
                    .values()
                    .find(|template| template.name.eq_ignore_ascii_case(id))
            })
            .cloned()
    }
}
