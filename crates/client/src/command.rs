//! Parsing of REPL input lines.
//!
//! - `/attack [adv|dis] [target]` and the other turn actions
//! - `/status`, `/log`, `/quit` for the session itself
//! - `!text` is admin text, any other line is generated narrative

use encounter_core::{Action, ActionError, ActionKind, RollMode};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Act(Action),
    /// Text from the game master; trusted directives.
    Admin(String),
    /// Text from the narrative generator.
    Narrative(String),
    Status,
    Log,
    Quit,
    Empty,
}

/// Parses one input line.
pub fn parse(line: &str) -> Result<Command, ActionError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Command::Empty);
    }
    if let Some(admin) = line.strip_prefix('!') {
        return Ok(Command::Admin(admin.trim().to_owned()));
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Ok(Command::Narrative(line.to_owned()));
    };

    let mut words = rest.split_whitespace();
    let name = words.next().unwrap_or_default();
    match name.to_ascii_lowercase().as_str() {
        "status" => return Ok(Command::Status),
        "log" => return Ok(Command::Log),
        "quit" | "exit" => return Ok(Command::Quit),
        _ => {}
    }

    let mut action = Action::parse(name)?;
    for word in words {
        match RollMode::parse(word) {
            Ok(mode) => action.modifiers.roll_mode = mode,
            Err(_) if action.kind == ActionKind::Attack && action.modifiers.target.is_none() => {
                action.modifiers.target = Some(word.to_owned());
            }
            Err(error) => return Err(error),
        }
    }
    Ok(Command::Act(action))
}
