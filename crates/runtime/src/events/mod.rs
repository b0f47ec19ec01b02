//! Topic-based event bus for session output.
//!
//! The service publishes every applied patch on [`Topic::Combat`] and the
//! redacted facts plus any narrator text on [`Topic::Narration`]. Delivery is
//! best-effort: events published with no subscriber are dropped.

mod bus;

pub use bus::{Event, EventBus, Topic};
