use super::{LineEvent, LineKind, LogLine, LogPatch, status_line};
use crate::state::CombatState;

/// Accumulates lines for one call and produces the final [`LogPatch`].
///
/// Lines are append-only. Consecutive status-equivalent lines are dropped and
/// the oldest lines fall off once `cap` is reached.
#[derive(Clone, Debug)]
pub struct LogPatchBuilder {
    lines: Vec<LogLine>,
    cap: usize,
    status: Option<String>,
    open: Option<bool>,
    reset: bool,
}

impl LogPatchBuilder {
    pub fn new(cap: usize) -> Self {
        Self {
            lines: Vec::new(),
            cap: cap.max(1),
            status: None,
            open: None,
            reset: false,
        }
    }

    pub fn push(&mut self, line: LogLine) {
        if self
            .lines
            .last()
            .is_some_and(|last| last.is_status_equivalent(&line))
        {
            return;
        }
        self.lines.push(line);
        if self.lines.len() > self.cap {
            let excess = self.lines.len() - self.cap;
            self.lines.drain(..excess);
        }
    }

    pub fn status(&mut self, text: impl Into<String>) {
        self.push(LogLine::new(LineKind::Status, text));
    }

    pub fn narrative(&mut self, text: impl Into<String>) {
        self.push(LogLine::new(LineKind::Narrative, text));
    }

    pub fn mechanic(&mut self, text: impl Into<String>) {
        self.push(LogLine::new(LineKind::Mechanic, text));
    }

    /// Pushes a line tagged with a structured event.
    pub fn event(&mut self, kind: LineKind, text: impl Into<String>, event: LineEvent) {
        self.push(LogLine::new(kind, text).with_event(event));
    }

    /// Round separator, emitted when the turn order wraps.
    pub fn separator(&mut self, round: u32) {
        self.event(
            LineKind::Status,
            format!("--- Round {round} ---"),
            LineEvent::Separator { round },
        );
    }

    /// Overrides the status header instead of recomputing it from state.
    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
    }

    pub fn set_open(&mut self, open: bool) {
        self.open = Some(open);
    }

    /// Marks the patch as replacing the UI ledger.
    pub fn set_reset(&mut self) {
        self.reset = true;
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[LogLine] {
        &self.lines
    }

    /// Finishes the patch. Status and panel visibility fall back to the state.
    pub fn build(self, state: Option<&CombatState>) -> LogPatch {
        let open = self
            .open
            .unwrap_or_else(|| state.is_some_and(|state| state.active));
        LogPatch {
            status: self.status.unwrap_or_else(|| status_line(state)),
            lines: self.lines,
            open,
            reset: self.reset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consecutive_status_duplicates_are_suppressed() {
        let mut log = LogPatchBuilder::new(10);
        log.status("Turn passes to: Goblin");
        log.status("turn  passes to: goblin");
        log.mechanic("Roll: d20(3) + 4 = 7 vs AC 15");
        log.status("Turn passes to: Goblin");
        assert_eq!(log.lines().len(), 3);
    }

    #[test]
    fn mechanic_lines_are_never_deduplicated() {
        let mut log = LogPatchBuilder::new(10);
        log.mechanic("Result: miss");
        log.mechanic("Result: miss");
        assert_eq!(log.lines().len(), 2);
    }

    #[test]
    fn oldest_lines_drop_at_cap() {
        let mut log = LogPatchBuilder::new(3);
        for n in 0..5 {
            log.mechanic(format!("line {n}"));
        }
        let texts: Vec<_> = log.lines().iter().map(|l| l.text.clone()).collect();
        assert_eq!(texts, ["line 2", "line 3", "line 4"]);
    }

    #[test]
    fn status_defaults_to_state() {
        let patch = LogPatchBuilder::new(5).build(None);
        assert_eq!(patch.status, "No active combat");
        assert!(!patch.open);
    }
}
