use std::collections::BTreeSet;

use crate::config::CombatConfig;

/// Word stems that suggest a fight is underway.
const COMBAT_STEMS: &[&str] = &[
    "ambush", "arrow", "attack", "battle", "blade", "charg", "fight", "hostil", "lunge", "slash",
    "strik", "sword", "weapon",
];

/// Distinct stems required before text counts as combat-like.
const MIN_DISTINCT_STEMS: usize = 2;

/// Bounded check for generated text that describes a fight without starting
/// one. Only the first [`CombatConfig::HEURISTIC_SCAN_CHARS`] characters are
/// inspected.
pub fn looks_like_combat(text: &str) -> bool {
    let window: String = text
        .chars()
        .take(CombatConfig::HEURISTIC_SCAN_CHARS)
        .collect::<String>()
        .to_lowercase();

    let mut matched = BTreeSet::new();
    for word in window.split(|c: char| !c.is_alphanumeric()) {
        if let Some(stem) = COMBAT_STEMS.iter().find(|stem| word.starts_with(**stem)) {
            matched.insert(*stem);
            if matched.len() >= MIN_DISTINCT_STEMS {
                return true;
            }
        }
    }
    false
}
