//! Authoritative encounter state.
//!
//! [`CombatState`] is owned by exactly one session. Callers query it freely
//! but mutate it only through the invariant-preserving methods below, the
//! turn engine, or the action handler.
mod combatant;
#[cfg(feature = "serde")]
pub mod snapshot;
mod turn;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

pub use combatant::{Combatant, PartyMember, Side, TurnFlags};
#[cfg(feature = "serde")]
pub use snapshot::{CombatSnapshot, SNAPSHOT_VERSION, SnapshotError};
pub use turn::{TurnAdvance, build_order};

/// Hit point change produced by a mutator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HpChange {
    pub before: i32,
    pub after: i32,
    pub max: i32,
}

impl HpChange {
    pub fn dropped_to_zero(&self) -> bool {
        self.before > 0 && self.after <= 0
    }
}

/// State of the single active encounter of a session.
///
/// Invariants:
/// - `order` is a permutation of the roster keys without duplicates
/// - `turn_index < order.len()` whenever `order` is non-empty
/// - every combatant's `hp` is within `[0, max_hp]`
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatState {
    pub active: bool,
    pub round: u32,
    pub turn_index: usize,
    pub order: Vec<String>,
    pub combatants: BTreeMap<String, Combatant>,
    pub started_at: DateTime<Utc>,
    /// Base seed for every roll of this encounter.
    pub seed: u64,
    /// Number of resolved actions; mixed into every roll seed.
    pub nonce: u64,
}

impl CombatState {
    /// Creates an active, empty encounter at round 1.
    pub fn new(seed: u64, started_at: DateTime<Utc>) -> Self {
        Self {
            active: true,
            round: 1,
            turn_index: 0,
            order: Vec::new(),
            combatants: BTreeMap::new(),
            started_at,
            seed,
            nonce: 0,
        }
    }

    pub fn combatant(&self, key: &str) -> Option<&Combatant> {
        self.combatants.get(key)
    }

    pub fn combatant_mut(&mut self, key: &str) -> Option<&mut Combatant> {
        self.combatants.get_mut(key)
    }

    /// Key of the combatant holding the turn.
    pub fn current_key(&self) -> Option<&str> {
        self.order.get(self.turn_index).map(String::as_str)
    }

    /// Combatant holding the turn.
    pub fn current(&self) -> Option<&Combatant> {
        self.current_key().and_then(|key| self.combatants.get(key))
    }

    /// Combatant that will act once down or escaped combatants are skipped,
    /// without mutating anything.
    pub fn upcoming_actor(&self) -> Option<&Combatant> {
        let len = self.order.len();
        (0..len)
            .map(|offset| &self.order[(self.turn_index + offset) % len])
            .filter_map(|key| self.combatants.get(key))
            .find(|combatant| combatant.can_act())
    }

    /// Combatants in initiative order.
    pub fn in_order(&self) -> impl Iterator<Item = &Combatant> {
        self.order.iter().filter_map(|key| self.combatants.get(key))
    }

    /// True when at least one member of `side` can still act.
    pub fn side_alive(&self, side: Side) -> bool {
        self.combatants
            .values()
            .any(|combatant| combatant.side == side && combatant.can_act())
    }

    /// Number of sides with at least one standing, present member.
    pub fn living_sides(&self) -> usize {
        [Side::Pc, Side::Enemy]
            .into_iter()
            .filter(|side| self.side_alive(*side))
            .count()
    }

    pub fn has_enemies(&self) -> bool {
        self.combatants
            .values()
            .any(|combatant| combatant.side == Side::Enemy)
    }

    /// Adds an enemy, allocating `enemy_N` when the key is empty or taken.
    ///
    /// Returns the key the enemy was stored under.
    pub fn add_enemy(&mut self, mut combatant: Combatant) -> String {
        combatant.side = Side::Enemy;
        if combatant.key.trim().is_empty() || self.combatants.contains_key(&combatant.key) {
            combatant.key = self.allocate_enemy_key();
        }
        let key = combatant.key.clone();
        self.combatants.insert(key.clone(), combatant);
        self.rebuild_order();
        key
    }

    /// Inserts or refreshes a party member. An existing member keeps its
    /// current hit points, clamped to the new maximum.
    pub fn upsert_pc(&mut self, member: &PartyMember) {
        let incoming = member.to_combatant();
        match self.combatants.get_mut(&member.key) {
            Some(existing) => {
                let hp = existing.hp;
                existing.name = incoming.name;
                existing.side = Side::Pc;
                existing.max_hp = incoming.max_hp;
                existing.hp = hp.clamp(0, existing.max_hp);
                existing.ac = incoming.ac;
                existing.initiative = incoming.initiative;
                existing.profile = incoming.profile;
            }
            None => {
                self.combatants.insert(member.key.clone(), incoming);
            }
        }
        self.rebuild_order();
    }

    /// Applies damage, clamping into `[0, max]`.
    ///
    /// Returns `None` (no-op) when the target is unknown or already down.
    pub fn apply_damage(&mut self, key: &str, amount: i32) -> Option<HpChange> {
        let target = self.combatants.get_mut(key)?;
        if target.is_down() {
            return None;
        }
        let before = target.hp;
        target.hp = (before - amount.max(0)).clamp(0, target.max_hp);
        Some(HpChange {
            before,
            after: target.hp,
            max: target.max_hp,
        })
    }

    /// Restores hit points, clamped to max.
    pub fn heal(&mut self, key: &str, amount: i32) -> Option<HpChange> {
        let target = self.combatants.get_mut(key)?;
        let before = target.hp;
        target.hp = (before + amount.max(0)).clamp(0, target.max_hp);
        Some(HpChange {
            before,
            after: target.hp,
            max: target.max_hp,
        })
    }

    /// Flags a combatant as having left the fight. Returns false for unknown keys.
    pub fn mark_escaped(&mut self, key: &str) -> bool {
        match self.combatants.get_mut(key) {
            Some(combatant) => {
                combatant.escaped = true;
                true
            }
            None => false,
        }
    }

    fn allocate_enemy_key(&self) -> String {
        (1..)
            .map(|n| format!("enemy_{n}"))
            .find(|key| !self.combatants.contains_key(key))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> CombatState {
        let mut state = CombatState::new(7, DateTime::<Utc>::UNIX_EPOCH);
        state.upsert_pc(&PartyMember {
            key: "aria".into(),
            name: "Aria".into(),
            hp: 12,
            max_hp: 12,
            ac: 15,
            initiative: 15,
            profile: None,
        });
        state.add_enemy(Combatant::new("goblin", "Goblin", Side::Enemy, 7, 13, 10));
        state
    }

    #[test]
    fn apply_damage_clamps_at_zero() {
        let mut state = state();
        state.apply_damage("goblin", 6);
        let change = state.apply_damage("goblin", 5).unwrap();
        assert_eq!(change.before, 1);
        assert_eq!(change.after, 0);
        assert!(change.dropped_to_zero());
    }

    #[test]
    fn apply_damage_is_noop_on_down_target() {
        let mut state = state();
        state.apply_damage("goblin", 20);
        let before = state.clone();
        assert!(state.apply_damage("goblin", 3).is_none());
        assert_eq!(state, before);
    }

    #[test]
    fn negative_damage_does_not_heal() {
        let mut state = state();
        state.apply_damage("goblin", -5);
        assert_eq!(state.combatant("goblin").unwrap().hp, 7);
    }

    #[test]
    fn heal_clamps_to_max() {
        let mut state = state();
        state.apply_damage("aria", 5);
        let change = state.heal("aria", 50).unwrap();
        assert_eq!(change.after, 12);
    }

    #[test]
    fn colliding_enemy_key_is_reallocated() {
        let mut state = state();
        let key = state.add_enemy(Combatant::new("goblin", "Goblin", Side::Enemy, 7, 13, 8));
        assert_eq!(key, "enemy_1");
        let key = state.add_enemy(Combatant::new("", "Wolf", Side::Enemy, 11, 13, 12));
        assert_eq!(key, "enemy_2");
        assert_eq!(state.order.len(), 4);
    }

    #[test]
    fn upsert_existing_pc_keeps_hp_clamped() {
        let mut state = state();
        state.apply_damage("aria", 2);
        state.upsert_pc(&PartyMember {
            key: "aria".into(),
            name: "Aria".into(),
            hp: 12,
            max_hp: 8,
            ac: 16,
            initiative: 15,
            profile: Some("longsword".into()),
        });
        let aria = state.combatant("aria").unwrap();
        assert_eq!(aria.hp, 8);
        assert_eq!(aria.ac, 16);
        assert_eq!(state.order.len(), 2);
    }

    #[test]
    fn side_alive_ignores_escaped() {
        let mut state = state();
        assert_eq!(state.living_sides(), 2);
        state.mark_escaped("aria");
        assert!(!state.side_alive(Side::Pc));
        assert_eq!(state.living_sides(), 1);
    }

    #[test]
    fn upcoming_actor_skips_down_combatants() {
        let mut state = state();
        state.apply_damage("aria", 99);
        assert_eq!(state.current_key(), Some("aria"));
        assert_eq!(state.upcoming_actor().map(|c| c.key.as_str()), Some("goblin"));
    }
}
