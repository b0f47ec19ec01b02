//! Repository layer for encounter snapshots.
//!
//! Repositories persist the versioned snapshot of a session's encounter so a
//! restarted host can pick the fight back up. Static content (weapons, enemy
//! templates) is served by the stats oracle, not by a repository.

mod error;
mod file;
mod memory;
mod traits;

pub use error::{RepositoryError, Result};
pub use file::FileSnapshotRepository;
pub use memory::InMemorySnapshotRepo;
pub use traits::SnapshotRepository;
