//! Topic-based event bus implementation.

use encounter_core::{LogPatch, NarrationFact};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Log patches for the session UI
    Combat,
    /// Spoiler-safe facts and narrator output
    Narration,
}

/// Event wrapper that carries the session and typed payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// A patch as applied to the session ledger.
    Patch { session: String, patch: LogPatch },
    /// Facts extracted from the same patch.
    Facts {
        session: String,
        facts: Vec<NarrationFact>,
    },
    /// Text returned by the narrator for those facts.
    Narration { session: String, text: String },
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Patch { .. } => Topic::Combat,
            Event::Facts { .. } | Event::Narration { .. } => Topic::Narration,
        }
    }

    pub fn session(&self) -> &str {
        match self {
            Event::Patch { session, .. }
            | Event::Facts { session, .. }
            | Event::Narration { session, .. } => session,
        }
    }
}

/// Topic-based event bus
///
/// Allows consumers to subscribe to specific topics and only receive
/// events they care about. Cloning shares the underlying channels.
#[derive(Clone)]
pub struct EventBus {
    combat: broadcast::Sender<Event>,
    narration: broadcast::Sender<Event>,
}

impl EventBus {
    /// Default per-topic buffer.
    pub const DEFAULT_CAPACITY: usize = 100;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Creates a bus whose topics each buffer `capacity` events.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            combat: broadcast::channel(capacity).0,
            narration: broadcast::channel(capacity).0,
        }
    }

    fn sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Combat => &self.combat,
            Topic::Narration => &self.narration,
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: Event) {
        let topic = event.topic();
        if self.sender(topic).send(event).is_err() {
            tracing::trace!(target: "runtime::events", ?topic, "no subscribers for topic");
        }
    }

    /// Subscribe to a specific topic
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.sender(topic).subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("combat_subscribers", &self.combat.receiver_count())
            .field("narration_subscribers", &self.narration.receiver_count())
            .finish()
    }
}
