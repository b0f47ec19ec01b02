//! Seam to the external narrative generator.

use async_trait::async_trait;
use encounter_core::NarrationFact;

/// Turns spoiler-safe facts into prose.
///
/// Called after the session lock is released; a slow narrator never blocks
/// other requests for the same session.
#[async_trait]
pub trait Narrator: Send + Sync {
    /// Returns narrative text for `facts`, or `None` to stay silent.
    async fn narrate(&self, session: &str, facts: &[NarrationFact]) -> Option<String>;
}

/// Narrator that never produces text.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNarrator;

#[async_trait]
impl Narrator for NullNarrator {
    async fn narrate(&self, _session: &str, _facts: &[NarrationFact]) -> Option<String> {
        None
    }
}

/// Narrator that joins the fact texts into one paragraph.
#[derive(Debug, Clone, Copy, Default)]
pub struct FactNarrator;

#[async_trait]
impl Narrator for FactNarrator {
    async fn narrate(&self, _session: &str, facts: &[NarrationFact]) -> Option<String> {
        if facts.is_empty() {
            return None;
        }
        let text = facts
            .iter()
            .map(|fact| fact.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        Some(text)
    }
}
