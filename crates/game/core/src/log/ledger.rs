use std::collections::VecDeque;

use super::{LineEvent, LineKind, LogLine, LogPatch};

const PREAMBLE: &str = "Hostiles close in. Roll for initiative!";

/// Session-wide ledger of log lines across calls.
///
/// Applies the same cap and de-duplication as a single patch, and inserts a
/// one-time preamble before the first enemy joins an empty ledger.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatLog {
    lines: VecDeque<LogLine>,
    cap: usize,
    status: String,
}

impl CombatLog {
    pub fn new(cap: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            cap: cap.max(1),
            status: super::NO_COMBAT_STATUS.to_owned(),
        }
    }

    pub fn lines(&self) -> impl Iterator<Item = &LogLine> {
        self.lines.iter()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Latest status header.
    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Appends a patch and returns it as the UI should apply it: with the
    /// preamble inserted and lines already in the ledger's tail deduplicated.
    pub fn apply(&mut self, patch: LogPatch) -> LogPatch {
        if patch.reset {
            self.lines.clear();
        }

        let mut preamble_pending = self.lines.is_empty()
            && patch
                .events()
                .any(|event| matches!(event, LineEvent::EnemyJoined { .. }));

        let mut applied: Vec<LogLine> = Vec::with_capacity(patch.lines.len() + 1);
        for line in patch.lines {
            if preamble_pending && matches!(line.event, Some(LineEvent::EnemyJoined { .. })) {
                applied.push(LogLine::new(LineKind::Narrative, PREAMBLE));
                preamble_pending = false;
            }

            let duplicate = applied
                .last()
                .or_else(|| self.lines.back())
                .is_some_and(|last| last.is_status_equivalent(&line));
            if duplicate {
                continue;
            }
            applied.push(line);
        }

        for line in &applied {
            self.lines.push_back(line.clone());
        }
        while self.lines.len() > self.cap {
            self.lines.pop_front();
        }
        self.status = patch.status.clone();

        LogPatch {
            status: patch.status,
            lines: applied,
            open: patch.open,
            reset: patch.reset,
        }
    }
}

impl Default for CombatLog {
    fn default() -> Self {
        Self::new(crate::config::CombatConfig::DEFAULT_LOG_CAP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patch(lines: Vec<LogLine>) -> LogPatch {
        LogPatch {
            status: "status".into(),
            lines,
            open: true,
            reset: false,
        }
    }

    fn joined(name: &str) -> LogLine {
        LogLine::new(LineKind::Narrative, format!("{name} joins the fight."))
            .with_event(LineEvent::EnemyJoined { name: name.into() })
    }

    #[test]
    fn preamble_precedes_first_enemy_once() {
        let mut log = CombatLog::new(50);
        let applied = log.apply(patch(vec![
            LogLine::new(LineKind::Status, "Combat begins"),
            joined("Goblin"),
            joined("Wolf"),
        ]));
        let texts: Vec<_> = applied.lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(
            texts,
            [
                "Combat begins",
                PREAMBLE,
                "Goblin joins the fight.",
                "Wolf joins the fight."
            ]
        );

        let applied = log.apply(patch(vec![joined("Ogre")]));
        assert_eq!(applied.lines.len(), 1);
    }

    #[test]
    fn status_duplicates_across_calls_are_dropped() {
        let mut log = CombatLog::new(50);
        log.apply(patch(vec![LogLine::new(LineKind::Status, "Turn passes to: Aria")]));
        let applied = log.apply(patch(vec![LogLine::new(
            LineKind::Status,
            "Turn passes to: Aria",
        )]));
        assert!(applied.lines.is_empty());
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn reset_clears_and_cap_holds() {
        let mut log = CombatLog::new(2);
        log.apply(patch(
            (0..4)
                .map(|n| LogLine::new(LineKind::Mechanic, format!("{n}")))
                .collect(),
        ));
        assert_eq!(log.len(), 2);

        let mut reset = patch(vec![LogLine::new(LineKind::Mechanic, "fresh")]);
        reset.reset = true;
        log.apply(reset);
        assert_eq!(log.lines().map(|l| l.text.as_str()).collect::<Vec<_>>(), ["fresh"]);
    }
}
