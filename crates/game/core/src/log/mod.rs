//! Display-ready encounter log.
//!
//! Every resolution step produces a [`LogPatch`]: a status header plus capped,
//! tagged lines. Lines also carry an optional structured [`LineEvent`]; the
//! narration extractor reads only those events, never the display text.

mod builder;
mod ledger;
mod status;

use strum::{AsRefStr, Display};

pub use builder::LogPatchBuilder;
pub use ledger::CombatLog;
pub use status::{ENDED_STATUS, NO_COMBAT_STATUS, status_line};

use crate::action::Stance;
use crate::combat::HitOutcome;
use crate::engine::EncounterOutcome;
use crate::state::Side;

/// Display category of a line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LineKind {
    Status,
    Narrative,
    Mechanic,
}

/// Structured meaning of a line, independent of its display text.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum LineEvent {
    Attack {
        attacker: String,
        target: String,
    },
    AttackResult {
        attacker: String,
        target: String,
        outcome: HitOutcome,
    },
    HitPoints {
        name: String,
        hp: i32,
        max_hp: i32,
    },
    Down {
        name: String,
        side: Side,
    },
    Stance {
        name: String,
        stance: Stance,
    },
    Escape {
        name: String,
        success: bool,
    },
    EncounterEnded {
        outcome: Option<EncounterOutcome>,
    },
    Separator {
        round: u32,
    },
    Skip {
        name: String,
    },
    EnemyJoined {
        name: String,
    },
    RandomEvent {
        key: String,
        category: Option<String>,
    },
}

/// One log line.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LogLine {
    pub text: String,
    pub kind: LineKind,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub event: Option<LineEvent>,
}

impl LogLine {
    pub fn new(kind: LineKind, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind,
            event: None,
        }
    }

    #[must_use]
    pub fn with_event(mut self, event: LineEvent) -> Self {
        self.event = Some(event);
        self
    }

    /// Two lines are status-equivalent when both are status lines whose text
    /// matches after whitespace collapsing and case folding.
    pub fn is_status_equivalent(&self, other: &LogLine) -> bool {
        self.kind == LineKind::Status
            && other.kind == LineKind::Status
            && normalize(&self.text) == normalize(&other.text)
    }
}

fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Result of one engine or directive call, ready for the session UI.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LogPatch {
    pub status: String,
    pub lines: Vec<LogLine>,
    /// Whether the combat panel should be visible.
    #[cfg_attr(feature = "serde", serde(default))]
    pub open: bool,
    /// The UI should clear its ledger before appending `lines`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub reset: bool,
}

impl LogPatch {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Iterates the structured events carried by the lines.
    pub fn events(&self) -> impl Iterator<Item = &LineEvent> {
        self.lines.iter().filter_map(|line| line.event.as_ref())
    }

    /// Appends a later patch: its status/open win, `reset` sticks, lines are
    /// deduplicated and capped.
    pub fn merge(&mut self, later: LogPatch, cap: usize) {
        if later.reset {
            self.lines.clear();
            self.reset = true;
        }
        self.status = later.status;
        self.open = later.open;
        for line in later.lines {
            if self
                .lines
                .last()
                .is_some_and(|last| last.is_status_equivalent(&line))
            {
                continue;
            }
            self.lines.push(line);
        }
        let cap = cap.max(1);
        if self.lines.len() > cap {
            let excess = self.lines.len() - cap;
            self.lines.drain(..excess);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_equivalence_ignores_case_and_spacing() {
        let a = LogLine::new(LineKind::Status, "Turn passes to:  Goblin");
        let b = LogLine::new(LineKind::Status, "turn passes to: goblin ");
        let c = LogLine::new(LineKind::Mechanic, "Turn passes to: Goblin");
        assert!(a.is_status_equivalent(&b));
        assert!(!a.is_status_equivalent(&c));
    }

    #[test]
    fn merge_dedups_across_boundary_and_caps() {
        let mut first = LogPatch {
            status: "one".into(),
            lines: vec![
                LogLine::new(LineKind::Mechanic, "a"),
                LogLine::new(LineKind::Status, "Turn passes to: Aria"),
            ],
            open: true,
            reset: false,
        };
        let second = LogPatch {
            status: "two".into(),
            lines: vec![
                LogLine::new(LineKind::Status, "turn passes to: aria"),
                LogLine::new(LineKind::Mechanic, "b"),
            ],
            open: false,
            reset: false,
        };
        first.merge(second, 2);
        assert_eq!(first.status, "two");
        assert!(!first.open);
        let texts: Vec<_> = first.lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, ["Turn passes to: Aria", "b"]);
    }
}
