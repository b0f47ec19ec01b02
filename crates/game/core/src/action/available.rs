//! Read-only answer to the `help` command.

use super::ActionKind;
use crate::state::CombatState;

/// Actions the combatant holding the turn can issue right now.
///
/// Without an active encounter only `help` is meaningful.
pub fn available_actions(state: Option<&CombatState>) -> Vec<ActionKind> {
    match state {
        Some(state) if state.active && state.upcoming_actor().is_some() => {
            ActionKind::all().collect()
        }
        _ => vec![ActionKind::Help],
    }
}

/// Help text listing valid commands and, when an encounter is running, the
/// standing opponents of the combatant about to act.
pub fn help_lines(state: Option<&CombatState>) -> Vec<String> {
    let commands = available_actions(state)
        .into_iter()
        .map(|kind| match kind {
            ActionKind::Attack => "attack [adv|dis] [target]".to_owned(),
            ActionKind::Escape => "escape [adv|dis]".to_owned(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ");

    let mut lines = vec![format!("Commands: {commands}")];
    if let Some(state) = state.filter(|state| state.active)
        && let Some(actor) = state.upcoming_actor()
    {
        let opponent = actor.side.opponent();
        let targets = state
            .in_order()
            .filter(|c| c.side == opponent && c.can_act())
            .map(|c| format!("{} ({})", c.name, c.key))
            .collect::<Vec<_>>();
        if !targets.is_empty() {
            lines.push(format!("Targets for {}: {}", actor.name, targets.join(", ")));
        }
    }
    lines
}
