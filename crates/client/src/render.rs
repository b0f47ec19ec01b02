//! Plain-text rendering of patches, facts and encounter state.

use encounter_core::{CombatState, DirectiveReport, LineKind, LogLine, LogPatch, NarrationFact};

pub fn line(line: &LogLine) -> String {
    match line.kind {
        LineKind::Status => format!("  == {}", line.text),
        LineKind::Narrative => format!("  {}", line.text),
        LineKind::Mechanic => format!("  · {}", line.text),
    }
}

pub fn patch(patch: &LogPatch) -> Vec<String> {
    let mut out = Vec::with_capacity(patch.lines.len() + 1);
    if patch.reset {
        out.push("  ---- new encounter ----".to_owned());
    }
    out.extend(patch.lines.iter().map(line));
    out.push(format!("[{}]", patch.status));
    out
}

pub fn facts(facts: &[NarrationFact]) -> Vec<String> {
    facts
        .iter()
        .map(|fact| {
            let marker = if fact.priority { '!' } else { '-' };
            format!("  {marker} {}", fact.text)
        })
        .collect()
}

/// Ignored and malformed directives, one line each.
pub fn report(report: &DirectiveReport) -> Vec<String> {
    let ignored = report
        .ignored
        .iter()
        .map(|ignored| format!("  ignored {}: {}", ignored.directive.tag(), ignored.reason));
    let malformed = report
        .malformed
        .iter()
        .map(|error| format!("  malformed: {error}"));
    ignored.chain(malformed).collect()
}

pub fn state(state: Option<&CombatState>) -> Vec<String> {
    let Some(state) = state else {
        return vec!["No encounter in this session.".to_owned()];
    };
    let mut out = vec![format!(
        "Round {} ({})",
        state.round,
        if state.active { "active" } else { "ended" }
    )];
    for (index, combatant) in state.in_order().enumerate() {
        let marker = if state.active && index == state.turn_index { '>' } else { ' ' };
        let condition = if combatant.escaped {
            " escaped"
        } else if combatant.is_down() {
            " down"
        } else {
            ""
        };
        out.push(format!(
            "{marker} {} [{}] {} HP {}/{} AC {}{condition}",
            combatant.name,
            combatant.key,
            combatant.side,
            combatant.hp,
            combatant.max_hp,
            combatant.ac,
        ));
    }
    out
}
