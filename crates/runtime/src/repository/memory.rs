//! In-memory SnapshotRepository implementation for tests and local runs.

use std::collections::HashMap;
use std::sync::RwLock;

use encounter_core::{CombatSnapshot, CombatState};

use crate::repository::{RepositoryError, Result, SnapshotRepository};

/// In-memory implementation of [`SnapshotRepository`].
///
/// Keeps the encoded envelope rather than the state itself so restores go
/// through the same version check as the file repository.
#[derive(Debug, Default)]
pub struct InMemorySnapshotRepo {
    snapshots: RwLock<HashMap<String, String>>,
}

impl InMemorySnapshotRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store raw snapshot text as-is. Mostly useful to simulate stale or
    /// corrupted snapshots in tests.
    pub fn insert_raw(&self, session: impl Into<String>, raw: impl Into<String>) -> Result<()> {
        let mut snapshots = self
            .snapshots
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        snapshots.insert(session.into(), raw.into());
        Ok(())
    }
}

impl SnapshotRepository for InMemorySnapshotRepo {
    fn save(&self, session: &str, state: &CombatState) -> Result<()> {
        let raw = CombatSnapshot::encode(state)?;
        self.insert_raw(session, raw)
    }

    fn load(&self, session: &str) -> Result<Option<CombatState>> {
        let snapshots = self
            .snapshots
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        snapshots
            .get(session)
            .map(|raw| CombatSnapshot::decode(raw).map_err(RepositoryError::from))
            .transpose()
    }

    fn delete(&self, session: &str) -> Result<()> {
        let mut snapshots = self
            .snapshots
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        snapshots.remove(session);
        Ok(())
    }

    fn list_sessions(&self) -> Result<Vec<String>> {
        let snapshots = self
            .snapshots
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let mut sessions: Vec<String> = snapshots.keys().cloned().collect();
        sessions.sort_unstable();
        Ok(sessions)
    }
}
