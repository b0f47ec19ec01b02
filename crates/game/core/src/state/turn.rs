use std::collections::{BTreeMap, BTreeSet};

use super::{CombatState, Combatant, TurnFlags};

/// Result of moving the turn pointer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnAdvance {
    /// True when the pointer wrapped to the head of the order.
    pub wrapped: bool,
    /// Round after the move.
    pub round: u32,
    /// Key of the combatant now holding the turn.
    pub next: Option<String>,
}

/// Deterministic initiative order: initiative descending, PCs before enemies,
/// then case-insensitive name, then key. Independent of insertion order.
pub fn build_order(roster: &BTreeMap<String, Combatant>) -> Vec<String> {
    let mut combatants: Vec<&Combatant> = roster.values().collect();
    combatants.sort_by(|a, b| {
        b.initiative
            .cmp(&a.initiative)
            .then_with(|| a.side.cmp(&b.side))
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
            .then_with(|| a.key.cmp(&b.key))
    });
    combatants.into_iter().map(|c| c.key.clone()).collect()
}

impl CombatState {
    /// Moves the turn to the next slot, wrapping into a new round, and clears
    /// the transient flags of the combatant whose turn begins.
    pub fn advance(&mut self) -> TurnAdvance {
        let len = self.order.len();
        if len == 0 {
            self.turn_index = 0;
            return TurnAdvance {
                wrapped: false,
                round: self.round,
                next: None,
            };
        }

        let next_index = (self.turn_index + 1) % len;
        let wrapped = next_index == 0;
        if wrapped {
            self.round = self.round.saturating_add(1);
        }
        self.turn_index = next_index;

        let next = self.order[next_index].clone();
        if let Some(combatant) = self.combatants.get_mut(&next) {
            combatant.flags = TurnFlags::empty();
        }

        TurnAdvance {
            wrapped,
            round: self.round,
            next: Some(next),
        }
    }

    /// Rebuilds the order after a roster change, keeping the turn with the
    /// combatant that held it. Before anyone has acted (round 1, first slot)
    /// the turn goes to the head of the new order instead.
    pub fn rebuild_order(&mut self) {
        let holder = self.current_key().map(str::to_owned);
        let first_slot = self.round <= 1 && self.turn_index == 0;

        self.order = build_order(&self.combatants);
        if self.order.is_empty() {
            self.turn_index = 0;
            return;
        }

        let fallback = self.turn_index.min(self.order.len() - 1);
        self.turn_index = if first_slot {
            0
        } else {
            holder
                .and_then(|key| self.order.iter().position(|k| *k == key))
                .unwrap_or(fallback)
        };
    }

    /// True when `order` is a duplicate-free permutation of the roster keys.
    pub fn order_is_consistent(&self) -> bool {
        let unique: BTreeSet<&String> = self.order.iter().collect();
        unique.len() == self.order.len()
            && self.order.len() == self.combatants.len()
            && self.order.iter().all(|key| self.combatants.contains_key(key))
    }

    /// Restores the order/index invariants on a state of unknown provenance.
    ///
    /// Returns true when anything had to change.
    pub fn repair(&mut self) -> bool {
        let mut repaired = false;
        if !self.order_is_consistent() {
            let holder = self.current_key().map(str::to_owned);
            self.order = build_order(&self.combatants);
            self.turn_index = holder
                .and_then(|key| self.order.iter().position(|k| *k == key))
                .unwrap_or(0);
            repaired = true;
        }
        if !self.order.is_empty() && self.turn_index >= self.order.len() {
            self.turn_index %= self.order.len();
            repaired = true;
        }
        if self.order.is_empty() && self.turn_index != 0 {
            self.turn_index = 0;
            repaired = true;
        }
        if self.round == 0 {
            self.round = 1;
            repaired = true;
        }
        for combatant in self.combatants.values_mut() {
            let clamped = combatant.hp.clamp(0, combatant.max_hp.max(0));
            if clamped != combatant.hp {
                combatant.hp = clamped;
                repaired = true;
            }
        }
        repaired
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};

    use super::*;
    use crate::state::Side;

    fn roster(entries: &[(&str, &str, Side, i32)]) -> BTreeMap<String, Combatant> {
        entries
            .iter()
            .map(|(key, name, side, init)| {
                (
                    key.to_string(),
                    Combatant::new(*key, *name, *side, 10, 10, *init),
                )
            })
            .collect()
    }

    fn state_with(entries: &[(&str, &str, Side, i32)]) -> CombatState {
        let mut state = CombatState::new(1, DateTime::<Utc>::UNIX_EPOCH);
        state.combatants = roster(entries);
        state.order = build_order(&state.combatants);
        state
    }

    #[test]
    fn order_sorts_by_initiative_side_name_key() {
        let roster = roster(&[
            ("wolf", "wolf", Side::Enemy, 12),
            ("bob", "Bob", Side::Pc, 12),
            ("aria", "Aria", Side::Pc, 15),
            ("b2", "bob", Side::Pc, 12),
            ("gob", "Goblin", Side::Enemy, 10),
        ]);
        assert_eq!(build_order(&roster), ["aria", "b2", "bob", "wolf", "gob"]);
    }

    #[test]
    fn order_is_independent_of_insertion_order() {
        let forward = roster(&[("a", "A", Side::Pc, 3), ("b", "B", Side::Enemy, 3)]);
        let mut reversed = BTreeMap::new();
        for (k, v) in forward.iter().rev() {
            reversed.insert(k.clone(), v.clone());
        }
        assert_eq!(build_order(&forward), build_order(&reversed));
    }

    #[test]
    fn advance_wraps_and_increments_round_once() {
        let mut state = state_with(&[
            ("aria", "Aria", Side::Pc, 15),
            ("gob", "Goblin", Side::Enemy, 10),
            ("wolf", "Wolf", Side::Enemy, 5),
        ]);
        for _ in 0..3 {
            let step = state.advance();
            assert!(state.turn_index < state.order.len());
            assert_eq!(step.wrapped, state.turn_index == 0);
        }
        assert_eq!(state.round, 2);
        assert_eq!(state.current_key(), Some("aria"));
    }

    #[test]
    fn advance_clears_flags_of_incoming_combatant_only() {
        let mut state = state_with(&[
            ("aria", "Aria", Side::Pc, 15),
            ("gob", "Goblin", Side::Enemy, 10),
        ]);
        for combatant in state.combatants.values_mut() {
            combatant.flags = TurnFlags::DODGING;
        }
        state.advance();
        assert!(state.combatant("gob").unwrap().flags.is_empty());
        assert_eq!(state.combatant("aria").unwrap().flags, TurnFlags::DODGING);
    }

    #[test]
    fn advance_on_empty_order_is_harmless() {
        let mut state = CombatState::new(1, DateTime::<Utc>::UNIX_EPOCH);
        let step = state.advance();
        assert_eq!(step.next, None);
        assert_eq!(state.round, 1);
    }

    #[test]
    fn rebuild_preserves_turn_holder() {
        let mut state = state_with(&[
            ("aria", "Aria", Side::Pc, 15),
            ("gob", "Goblin", Side::Enemy, 10),
        ]);
        state.advance();
        assert_eq!(state.current_key(), Some("gob"));

        state
            .combatants
            .insert("ogre".into(), Combatant::new("ogre", "Ogre", Side::Enemy, 30, 11, 20));
        state.rebuild_order();
        assert_eq!(state.order, ["ogre", "aria", "gob"]);
        assert_eq!(state.current_key(), Some("gob"));
    }

    #[test]
    fn rebuild_in_first_slot_starts_at_head() {
        let mut state = state_with(&[("aria", "Aria", Side::Pc, 15)]);
        state
            .combatants
            .insert("ogre".into(), Combatant::new("ogre", "Ogre", Side::Enemy, 30, 11, 20));
        state.rebuild_order();
        assert_eq!(state.current_key(), Some("ogre"));
    }

    #[test]
    fn repair_fixes_broken_order_and_index() {
        let mut state = state_with(&[
            ("aria", "Aria", Side::Pc, 15),
            ("gob", "Goblin", Side::Enemy, 10),
        ]);
        state.order = vec!["gob".into(), "gob".into(), "ghost".into()];
        state.turn_index = 0;
        assert!(state.repair());
        assert!(state.order_is_consistent());
        assert_eq!(state.current_key(), Some("gob"));

        state.turn_index = 9;
        assert!(state.repair());
        assert!(state.turn_index < state.order.len());
        assert!(!state.repair());
    }
}
