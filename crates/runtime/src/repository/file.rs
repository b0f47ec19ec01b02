//! File-based SnapshotRepository implementation.

use std::fs;
use std::path::{Path, PathBuf};

use encounter_core::{CombatSnapshot, CombatState};

use crate::repository::{Result, SnapshotRepository};

const SUFFIX: &str = ".snapshot.json";

/// Stores one versioned JSON snapshot per session as
/// `{session}.snapshot.json`.
///
/// Writes go to a temporary file first and are renamed into place, so a
/// crash mid-write leaves the previous snapshot intact.
#[derive(Debug, Clone)]
pub struct FileSnapshotRepository {
    base_dir: PathBuf,
}

impl FileSnapshotRepository {
    /// Create the repository, creating `base_dir` if needed.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn snapshot_path(&self, session: &str) -> PathBuf {
        self.base_dir.join(format!("{session}{SUFFIX}"))
    }
}

impl SnapshotRepository for FileSnapshotRepository {
    fn save(&self, session: &str, state: &CombatState) -> Result<()> {
        let path = self.snapshot_path(session);
        let temp_path = path.with_extension("json.tmp");

        let raw = CombatSnapshot::encode(state)?;
        fs::write(&temp_path, raw)?;
        fs::rename(&temp_path, &path)?;

        tracing::debug!(
            target: "runtime::repository",
            session,
            nonce = state.nonce,
            path = %path.display(),
            "saved snapshot"
        );
        Ok(())
    }

    fn load(&self, session: &str) -> Result<Option<CombatState>> {
        let path = self.snapshot_path(session);
        if !path.exists() {
            return Ok(None);
        }

        let raw = fs::read_to_string(&path)?;
        let state = CombatSnapshot::decode(&raw)?;

        tracing::debug!(
            target: "runtime::repository",
            session,
            nonce = state.nonce,
            "loaded snapshot"
        );
        Ok(Some(state))
    }

    fn delete(&self, session: &str) -> Result<()> {
        let path = self.snapshot_path(session);
        if path.exists() {
            fs::remove_file(&path)?;
            tracing::debug!(target: "runtime::repository", session, "deleted snapshot");
        }
        Ok(())
    }

    fn list_sessions(&self) -> Result<Vec<String>> {
        let mut sessions = Vec::new();

        for entry in fs::read_dir(&self.base_dir)? {
            let path = entry?.path();
            if let Some(filename) = path.file_name().and_then(|s| s.to_str())
                && let Some(session) = filename.strip_suffix(SUFFIX)
                && !session.is_empty()
            {
                sessions.push(session.to_owned());
            }
        }

        sessions.sort_unstable();
        Ok(sessions)
    }
}
