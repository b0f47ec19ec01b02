//! Session orchestration for the encounter engine.
//!
//! This crate wraps the synchronous rules in `encounter-core` with everything
//! a live narrative session needs: one writer lock per session, snapshot
//! persistence, an event bus for UI and narration consumers, and the seam to
//! an external narrator.
//!
//! Modules are organized by responsibility:
//! - [`service`] hosts [`EncounterService`] and its builder
//! - [`session`] provides the explicit per-session store
//! - [`repository`] persists versioned encounter snapshots
//! - [`events`] provides the topic-based event bus
//! - [`narrator`] defines the narrator seam
pub mod config;
pub mod error;
pub mod events;
pub mod narrator;
pub mod repository;
pub mod service;
pub mod session;

pub use config::{RuntimeConfig, default_save_dir};
pub use error::{Result, RuntimeError};
pub use events::{Event, EventBus, Topic};
pub use narrator::{FactNarrator, Narrator, NullNarrator};
pub use repository::{
    FileSnapshotRepository, InMemorySnapshotRepo, RepositoryError, SnapshotRepository,
};
pub use service::{ActionReply, DirectiveReply, EncounterService, EncounterServiceBuilder};
pub use session::{SessionHandle, SessionSlot, SessionStore};
