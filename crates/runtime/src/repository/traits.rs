//! Repository contract for persisting encounter snapshots.

use encounter_core::CombatState;

use crate::repository::Result;

/// Snapshot storage keyed by session id.
///
/// Implementations store the versioned snapshot envelope, so a stored state
/// written by an incompatible build comes back as
/// [`RepositoryError::Snapshot`](crate::repository::RepositoryError::Snapshot)
/// rather than a panic.
pub trait SnapshotRepository: Send + Sync {
    /// Replace the snapshot stored for `session`.
    fn save(&self, session: &str, state: &CombatState) -> Result<()>;

    /// Load the snapshot stored for `session`, if any.
    fn load(&self, session: &str) -> Result<Option<CombatState>>;

    /// Remove the snapshot for `session`. Missing snapshots are not an error.
    fn delete(&self, session: &str) -> Result<()>;

    /// List session ids that currently have a snapshot.
    fn list_sessions(&self) -> Result<Vec<String>> {
        Ok(vec![])
    }
}
