//! Versioned snapshot codec for [`CombatState`].
//!
//! The snapshot is the only form of encounter state that leaves the engine.
//! Wire shape: `{ "v": 1, "state": { ... } }`.

use serde::{Deserialize, Serialize};

use super::CombatState;
use crate::error::{ErrorSeverity, GameError};

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Errors raised while encoding or decoding a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("unsupported snapshot version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("snapshot has no version header")]
    MissingVersion,

    #[error("malformed snapshot: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl GameError for SnapshotError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Internal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnsupportedVersion { .. } => "SNAPSHOT_UNSUPPORTED_VERSION",
            Self::MissingVersion => "SNAPSHOT_MISSING_VERSION",
            Self::Malformed(_) => "SNAPSHOT_MALFORMED",
        }
    }
}

/// Serializable envelope around a [`CombatState`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatSnapshot {
    pub v: u32,
    pub state: CombatState,
}

#[derive(Deserialize)]
struct VersionHeader {
    v: Option<u32>,
}

impl CombatSnapshot {
    pub fn capture(state: &CombatState) -> Self {
        Self {
            v: SNAPSHOT_VERSION,
            state: state.clone(),
        }
    }

    /// Encodes a state as snapshot JSON.
    pub fn encode(state: &CombatState) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string(&Self::capture(state))?)
    }

    /// Decodes snapshot JSON, checking the version header before the body.
    ///
    /// A decoded state whose order or turn index is inconsistent is repaired
    /// rather than rejected.
    pub fn decode(raw: &str) -> Result<CombatState, SnapshotError> {
        let header: VersionHeader = serde_json::from_str(raw)?;
        match header.v {
            None => return Err(SnapshotError::MissingVersion),
            Some(SNAPSHOT_VERSION) => {}
            Some(found) => {
                return Err(SnapshotError::UnsupportedVersion {
                    found,
                    expected: SNAPSHOT_VERSION,
                });
            }
        }

        let snapshot: Self = serde_json::from_str(raw)?;
        let mut state = snapshot.state;
        if state.repair() {
            tracing::warn!(
                target: "encounter::snapshot",
                round = state.round,
                "repaired inconsistent turn order in decoded snapshot"
            );
        }
        Ok(state)
    }

    /// Decodes a snapshot, degrading any failure to "no active encounter".
    pub fn restore(raw: &str) -> Option<CombatState> {
        match Self::decode(raw) {
            Ok(state) => Some(state),
            Err(error) => {
                tracing::warn!(
                    target: "encounter::snapshot",
                    code = error.error_code(),
                    %error,
                    "discarding unreadable snapshot"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};

    use super::*;
    use crate::state::{Combatant, PartyMember, Side, TurnFlags};

    fn sample() -> CombatState {
        let mut state = CombatState::new(99, DateTime::<Utc>::UNIX_EPOCH);
        state.upsert_pc(&PartyMember {
            key: "aria".into(),
            name: "Aria".into(),
            hp: 9,
            max_hp: 12,
            ac: 15,
            initiative: 15,
            profile: Some("longsword".into()),
        });
        state.add_enemy(Combatant::new("goblin", "Goblin", Side::Enemy, 7, 13, 10));
        state.combatant_mut("goblin").unwrap().flags = TurnFlags::DODGING;
        state.advance();
        state.nonce = 4;
        state
    }

    #[test]
    fn snapshot_round_trips() {
        let state = sample();
        let raw = CombatSnapshot::encode(&state).unwrap();
        assert!(raw.starts_with("{\"v\":1,"));
        assert_eq!(CombatSnapshot::decode(&raw).unwrap(), state);
    }

    #[test]
    fn mismatched_version_is_rejected() {
        let raw = CombatSnapshot::encode(&sample())
            .unwrap()
            .replacen("\"v\":1", "\"v\":2", 1);
        assert!(matches!(
            CombatSnapshot::decode(&raw),
            Err(SnapshotError::UnsupportedVersion { found: 2, .. })
        ));
        assert!(CombatSnapshot::restore(&raw).is_none());
    }

    #[test]
    fn garbage_degrades_to_none() {
        assert!(CombatSnapshot::restore("not json").is_none());
        assert!(matches!(
            CombatSnapshot::decode("{\"state\":{}}"),
            Err(SnapshotError::MissingVersion)
        ));
    }

    #[test]
    fn broken_order_is_repaired_on_decode() {
        let mut state = sample();
        state.order = vec!["goblin".into()];
        state.turn_index = 0;
        let raw = serde_json::to_string(&CombatSnapshot { v: 1, state }).unwrap();
        let restored = CombatSnapshot::decode(&raw).unwrap();
        assert!(restored.order_is_consistent());
        assert_eq!(restored.current_key(), Some("goblin"));
    }
}
