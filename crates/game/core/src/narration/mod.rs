//! Redacts a [`LogPatch`] into facts safe for the narrative generator.
//!
//! Only the structured [`LineEvent`]s are read. Rolls, damage, armor class,
//! weapon names and profile ids never reach a fact, because the events that
//! carry them are either skipped or reduced to coarse wording.

use strum::{AsRefStr, Display};

use crate::action::Stance;
use crate::combat::HitOutcome;
use crate::config::CombatConfig;
use crate::engine::EncounterOutcome;
use crate::log::{LineEvent, LogPatch};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FactKind {
    Attack,
    Outcome,
    HpChange,
    Escape,
    Victory,
    Defeat,
    CombatEnd,
}

/// One spoiler-safe statement about what just happened.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NarrationFact {
    pub kind: FactKind,
    /// Priority facts are listed before ordinary ones.
    pub priority: bool,
    pub text: String,
}

impl NarrationFact {
    fn new(kind: FactKind, text: String) -> Self {
        let priority = matches!(
            kind,
            FactKind::Escape | FactKind::Victory | FactKind::Defeat | FactKind::CombatEnd
        );
        Self {
            kind,
            priority,
            text,
        }
    }
}

/// Extracts at most `limit` facts (never more than [`CombatConfig::MAX_FACTS`]).
///
/// Priority facts come first; duplicates by text are dropped.
pub fn extract_facts(patch: &LogPatch, limit: usize) -> Vec<NarrationFact> {
    let mut facts: Vec<NarrationFact> = Vec::new();
    let mut pending_attack: Option<(&str, &str)> = None;

    for event in patch.events() {
        match event {
            LineEvent::Attack { attacker, target } => {
                if let Some((attacker, target)) = pending_attack.take() {
                    facts.push(plain_attack(attacker, target));
                }
                pending_attack = Some((attacker, target));
            }
            LineEvent::AttackResult {
                attacker,
                target,
                outcome,
            } => {
                pending_attack = None;
                facts.push(NarrationFact::new(
                    FactKind::Attack,
                    format!("{attacker} attacks {target} and {}.", attack_verb(*outcome)),
                ));
            }
            LineEvent::HitPoints { name, hp, max_hp } => {
                if let Some(band) = hp_band(*hp, *max_hp) {
                    facts.push(NarrationFact::new(FactKind::HpChange, format!("{name} {band}.")));
                }
            }
            LineEvent::Down { name, .. } => {
                facts.push(NarrationFact::new(FactKind::Outcome, format!("{name} goes down.")));
            }
            LineEvent::Stance { name, stance } => {
                facts.push(NarrationFact::new(FactKind::Outcome, stance_fact(name, *stance)));
            }
            LineEvent::Escape { name, success } => {
                let text = if *success {
                    format!("{name} breaks away from the fight.")
                } else {
                    format!("{name} tries to flee, but the escape falls apart.")
                };
                facts.push(NarrationFact::new(FactKind::Escape, text));
            }
            LineEvent::EncounterEnded { outcome } => facts.push(ending_fact(*outcome)),
            LineEvent::Separator { .. }
            | LineEvent::Skip { .. }
            | LineEvent::EnemyJoined { .. }
            | LineEvent::RandomEvent { .. } => {}
        }
    }
    if let Some((attacker, target)) = pending_attack {
        facts.push(plain_attack(attacker, target));
    }

    let limit = limit.min(CombatConfig::MAX_FACTS);
    let (priority, regular): (Vec<_>, Vec<_>) = facts.into_iter().partition(|fact| fact.priority);
    let mut ordered: Vec<NarrationFact> = Vec::with_capacity(limit);
    for fact in priority.into_iter().chain(regular) {
        if ordered.len() == limit {
            break;
        }
        if ordered.iter().any(|seen| seen.text == fact.text) {
            continue;
        }
        ordered.push(fact);
    }
    ordered
}

fn plain_attack(attacker: &str, target: &str) -> NarrationFact {
    NarrationFact::new(FactKind::Attack, format!("{attacker} attacks {target}."))
}

fn attack_verb(outcome: HitOutcome) -> &'static str {
    match outcome {
        HitOutcome::Hit => "hits",
        HitOutcome::Critical => "lands a crushing blow",
        HitOutcome::Miss => "misses",
        HitOutcome::Fumble => "stumbles badly",
    }
}

/// Coarse wording for the share of hit points left; `None` at zero, which is
/// reported as a down fact instead.
fn hp_band(hp: i32, max_hp: i32) -> Option<&'static str> {
    if hp <= 0 || max_hp <= 0 {
        return None;
    }
    let percent = i64::from(hp) * 100 / i64::from(max_hp);
    Some(match percent {
        75.. => "is barely scratched",
        40.. => "is wounded",
        15.. => "is badly wounded",
        _ => "is staggering",
    })
}

fn stance_fact(name: &str, stance: Stance) -> String {
    match stance {
        Stance::Dodge => format!("{name} takes a defensive stance."),
        Stance::Dash => format!("{name} surges forward, changing the distance."),
        Stance::Disengage => format!("{name} backs off without giving an opening."),
        Stance::UseObject => format!("{name} reaches for something at hand."),
    }
}

fn ending_fact(outcome: Option<EncounterOutcome>) -> NarrationFact {
    match outcome {
        Some(EncounterOutcome::Victory) => {
            NarrationFact::new(FactKind::Victory, "Victory: the fight is over.".to_owned())
        }
        Some(EncounterOutcome::Defeat) => {
            NarrationFact::new(FactKind::Defeat, "Defeat: the party falls.".to_owned())
        }
        Some(EncounterOutcome::Escaped) => {
            NarrationFact::new(FactKind::CombatEnd, "The party slips away and the fight ends.".to_owned())
        }
        Some(EncounterOutcome::Draw) | None => {
            NarrationFact::new(FactKind::CombatEnd, "The fight is over.".to_owned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::{LineKind, LogLine};
    use crate::state::Side;

    fn line(event: LineEvent) -> LogLine {
        LogLine::new(LineKind::Mechanic, "Roll: d20(14) + 3 = 17 vs AC 13").with_event(event)
    }

    fn patch(events: Vec<LineEvent>) -> LogPatch {
        LogPatch {
            status: "⚔ Combat • Round 2 • Turn: Goblin".into(),
            lines: events.into_iter().map(line).collect(),
            open: true,
            reset: false,
        }
    }

    #[test]
    fn hit_and_hp_band_become_facts() {
        let patch = patch(vec![
            LineEvent::Attack {
                attacker: "Aria".into(),
                target: "Goblin".into(),
            },
            LineEvent::AttackResult {
                attacker: "Aria".into(),
                target: "Goblin".into(),
                outcome: HitOutcome::Hit,
            },
            LineEvent::HitPoints {
                name: "Goblin".into(),
                hp: 1,
                max_hp: 7,
            },
        ]);
        let texts: Vec<_> = extract_facts(&patch, 10).into_iter().map(|f| f.text).collect();
        assert_eq!(texts, ["Aria attacks Goblin and hits.", "Goblin is staggering."]);
    }

    #[test]
    fn bands_follow_remaining_share() {
        assert_eq!(hp_band(8, 10), Some("is barely scratched"));
        assert_eq!(hp_band(4, 10), Some("is wounded"));
        assert_eq!(hp_band(2, 10), Some("is badly wounded"));
        assert_eq!(hp_band(1, 10), Some("is staggering"));
        assert_eq!(hp_band(0, 10), None);
    }

    #[test]
    fn priority_facts_come_first() {
        let patch = patch(vec![
            LineEvent::Stance {
                name: "Bram".into(),
                stance: Stance::Dodge,
            },
            LineEvent::Down {
                name: "Goblin".into(),
                side: Side::Enemy,
            },
            LineEvent::EncounterEnded {
                outcome: Some(EncounterOutcome::Victory),
            },
        ]);
        let facts = extract_facts(&patch, 10);
        assert_eq!(facts[0].kind, FactKind::Victory);
        assert!(facts[0].priority);
        assert_eq!(facts[1].text, "Bram takes a defensive stance.");
        assert_eq!(facts[2].text, "Goblin goes down.");
    }

    #[test]
    fn skips_mechanics_and_deduplicates() {
        let patch = patch(vec![
            LineEvent::Separator { round: 2 },
            LineEvent::Skip { name: "Bob".into() },
            LineEvent::EnemyJoined { name: "Wolf".into() },
            LineEvent::Escape {
                name: "Aria".into(),
                success: false,
            },
            LineEvent::Escape {
                name: "Aria".into(),
                success: false,
            },
        ]);
        let facts = extract_facts(&patch, 10);
        assert_eq!(facts.len(), 1);
        assert_eq!(facts[0].kind, FactKind::Escape);
    }

    #[test]
    fn limit_is_clamped() {
        let events = (0..30)
            .map(|n| LineEvent::Down {
                name: format!("Rat{}", char::from(b'a' + (n % 26) as u8)),
                side: Side::Enemy,
            })
            .collect();
        assert_eq!(extract_facts(&patch(events), 50).len(), CombatConfig::MAX_FACTS);
        assert_eq!(extract_facts(&patch(vec![]), 3).len(), 0);
    }
}
