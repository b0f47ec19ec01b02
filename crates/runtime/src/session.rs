//! Per-session slots guarded by one writer lock each.

use std::collections::HashMap;
use std::sync::Arc;

use encounter_core::{CombatLog, CombatState, PartyMember};
use tokio::sync::{Mutex, RwLock};

/// Everything the service keeps for one narrative session.
#[derive(Debug, Clone)]
pub struct SessionSlot {
    /// Current encounter, active or ended. `None` until the first start.
    pub state: Option<CombatState>,
    /// Lines already shown to the session UI.
    pub ledger: CombatLog,
    /// Party seeded into every new encounter.
    pub party: Vec<PartyMember>,
    /// Whether the persisted snapshot has been consulted yet.
    pub(crate) restored: bool,
}

impl SessionSlot {
    pub fn new(log_cap: usize) -> Self {
        Self {
            state: None,
            ledger: CombatLog::new(log_cap),
            party: Vec::new(),
            restored: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state.as_ref().is_some_and(|state| state.active)
    }
}

pub type SessionHandle = Arc<Mutex<SessionSlot>>;

/// Map of session id to slot.
///
/// The outer `RwLock` is held only long enough to find or insert a slot; all
/// mutation happens under the slot's own mutex, so independent sessions never
/// wait on each other.
#[derive(Debug)]
pub struct SessionStore {
    slots: RwLock<HashMap<String, SessionHandle>>,
    log_cap: usize,
}

impl SessionStore {
    pub fn new(log_cap: usize) -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
            log_cap,
        }
    }

    /// Returns the slot for `session`, creating an empty one on first use.
    pub async fn slot(&self, session: &str) -> SessionHandle {
        if let Some(slot) = self.slots.read().await.get(session) {
            return Arc::clone(slot);
        }
        let mut slots = self.slots.write().await;
        let slot = slots.entry(session.to_owned()).or_insert_with(|| {
            tracing::debug!(target: "runtime::session", session, "opened session slot");
            Arc::new(Mutex::new(SessionSlot::new(self.log_cap)))
        });
        Arc::clone(slot)
    }

    /// Returns the slot only if the session was opened before.
    pub async fn get(&self, session: &str) -> Option<SessionHandle> {
        self.slots.read().await.get(session).cloned()
    }

    pub async fn remove(&self, session: &str) -> Option<SessionHandle> {
        self.slots.write().await.remove(session)
    }

    pub async fn session_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.slots.read().await.keys().cloned().collect();
        ids.sort_unstable();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn same_id_shares_a_slot() {
        let store = SessionStore::new(50);
        let first = store.slot("a").await;
        let again = store.slot("a").await;
        let other = store.slot("b").await;

        assert!(Arc::ptr_eq(&first, &again));
        assert!(!Arc::ptr_eq(&first, &other));
        assert_eq!(store.session_ids().await, ["a", "b"]);

        store.remove("a").await;
        assert!(store.get("a").await.is_none());
    }

    #[tokio::test]
    async fn sessions_lock_independently() {
        let store = SessionStore::new(50);
        let a = store.slot("a").await;
        let _held = a.lock().await;

        let b = store.slot("b").await;
        let guard = b.try_lock();
        assert!(guard.is_ok());
    }
}
