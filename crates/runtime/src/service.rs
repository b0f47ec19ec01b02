//! Session-facing encounter service.
//!
//! [`EncounterService`] is the only writer of session encounters. Each call
//! locks the session slot, runs the synchronous core (directive application or
//! action resolution, then enemy auto-play), folds the patch into the session
//! ledger and persists the snapshot. Fact extraction, publishing and the
//! narrator run after the lock is released.

use std::sync::Arc;

use chrono::Utc;
use encounter_content::ContentCatalog;
use encounter_core::{
    Action, ActionKind, CombatEnv, CombatLog, CombatState, DirectiveApplier, DirectiveReport,
    DirectiveSource, LogPatch, NarrationFact, NoStats, PartyMember, PcgRng, RngOracle, Side,
    StatsOracle, TrustPolicy, extract_facts, resolve_current, run_enemy_turns,
};
use tokio::sync::broadcast;

use crate::config::RuntimeConfig;
use crate::error::{Result, RuntimeError};
use crate::events::{Event, EventBus, Topic};
use crate::narrator::{Narrator, NullNarrator};
use crate::repository::{FileSnapshotRepository, InMemorySnapshotRepo, SnapshotRepository};
use crate::session::{SessionSlot, SessionStore};

/// Output of one turn action.
#[derive(Clone, Debug, PartialEq)]
pub struct ActionReply {
    /// Patch as applied to the session ledger, enemy turns included.
    pub patch: LogPatch,
    pub facts: Vec<NarrationFact>,
    pub narration: Option<String>,
    /// Whether an encounter is still running after the call.
    pub active: bool,
}

/// Output of one directive-bearing text.
#[derive(Clone, Debug, PartialEq)]
pub struct DirectiveReply {
    pub report: DirectiveReport,
    /// `None` when the text changed neither the encounter nor the log.
    pub patch: Option<LogPatch>,
    pub facts: Vec<NarrationFact>,
    pub narration: Option<String>,
    pub active: bool,
}

/// What a locked call hands back to the unlocked tail of the request.
struct Committed {
    patch: Option<LogPatch>,
    active: bool,
}

/// Single-writer-per-session front door to the encounter engine.
pub struct EncounterService {
    config: RuntimeConfig,
    store: Arc<SessionStore>,
    repository: Arc<dyn SnapshotRepository>,
    stats: Arc<dyn StatsOracle>,
    rng: Arc<dyn RngOracle>,
    policy: TrustPolicy,
    narrator: Arc<dyn Narrator>,
    bus: EventBus,
}

impl EncounterService {
    pub fn builder() -> EncounterServiceBuilder {
        EncounterServiceBuilder::new()
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.bus.subscribe(topic)
    }

    /// Applies the directives embedded in `text`.
    pub async fn apply_text(
        &self,
        session: &str,
        source: DirectiveSource,
        text: &str,
    ) -> Result<DirectiveReply> {
        validate_session_id(session)?;
        let handle = self.store.slot(session).await;

        let (report, committed) = {
            let mut slot = handle.lock().await;
            self.restore(session, &mut slot);

            let now = Utc::now();
            let env = CombatEnv::new(&*self.stats, &*self.rng, &self.config.combat, now);
            let outcome = DirectiveApplier::new(&env, &self.policy).apply(
                source,
                text,
                &slot.party,
                slot.state.as_ref(),
            );

            let committed = match (outcome.patch, outcome.state) {
                (Some(patch), Some(state)) => self.commit(&env, session, &mut slot, patch, state),
                (Some(patch), None) => Committed {
                    patch: Some(slot.ledger.apply(patch)),
                    active: false,
                },
                (None, _) => Committed {
                    patch: None,
                    active: slot.is_active(),
                },
            };
            (outcome.report, committed)
        };

        tracing::debug!(
            target: "runtime::session",
            session,
            %source,
            honored = report.honored.len(),
            ignored = report.ignored.len(),
            malformed = report.malformed.len(),
            "applied directive text"
        );

        let (facts, narration) = match &committed.patch {
            Some(patch) => self.publish(session, patch).await,
            None => (Vec::new(), None),
        };
        Ok(DirectiveReply {
            report,
            patch: committed.patch,
            facts,
            narration,
            active: committed.active,
        })
    }

    /// Resolves one turn action, then lets enemies act until a PC is up.
    ///
    /// A rejected action leaves the session untouched.
    pub async fn act(&self, session: &str, action: Action) -> Result<ActionReply> {
        validate_session_id(session)?;
        let handle = self.store.slot(session).await;

        let committed = {
            let mut slot = handle.lock().await;
            self.restore(session, &mut slot);

            let now = Utc::now();
            let env = CombatEnv::new(&*self.stats, &*self.rng, &self.config.combat, now);
            let (patch, next) = resolve_current(&env, &action, slot.state.as_ref())?;

            match next {
                Some(next) if action.kind != ActionKind::Help => {
                    self.commit(&env, session, &mut slot, patch, next)
                }
                _ => Committed {
                    patch: Some(slot.ledger.apply(patch)),
                    active: slot.is_active(),
                },
            }
        };

        let patch = committed.patch.unwrap_or_default();
        let (facts, narration) = self.publish(session, &patch).await;
        Ok(ActionReply {
            patch,
            facts,
            narration,
            active: committed.active,
        })
    }

    /// Replaces the party seeded into new encounters and refreshes the PCs of
    /// a running one. PCs missing from `party` stay in the running encounter.
    pub async fn sync_party(&self, session: &str, party: Vec<PartyMember>) -> Result<()> {
        validate_session_id(session)?;
        let handle = self.store.slot(session).await;
        let mut slot = handle.lock().await;
        self.restore(session, &mut slot);

        let updated = match slot.state.as_mut() {
            Some(state) if state.active => {
                for member in &party {
                    state.upsert_pc(member);
                }
                state.nonce += 1;
                Some(state.clone())
            }
            _ => None,
        };
        slot.party = party;

        if let Some(state) = updated {
            self.persist(session, &state);
        }
        tracing::debug!(
            target: "runtime::session",
            session,
            members = slot.party.len(),
            "synced party roster"
        );
        Ok(())
    }

    /// Current encounter of `session`, active or ended.
    pub async fn current_state(&self, session: &str) -> Result<Option<CombatState>> {
        validate_session_id(session)?;
        let handle = self.store.slot(session).await;
        let mut slot = handle.lock().await;
        self.restore(session, &mut slot);
        Ok(slot.state.clone())
    }

    /// Copy of the session ledger.
    pub async fn ledger(&self, session: &str) -> Result<CombatLog> {
        validate_session_id(session)?;
        let handle = self.store.slot(session).await;
        let slot = handle.lock().await;
        Ok(slot.ledger.clone())
    }

    /// Drops the session slot and its persisted snapshot.
    pub async fn close_session(&self, session: &str) -> Result<()> {
        validate_session_id(session)?;
        if let Some(handle) = self.store.remove(session).await {
            // wait for any in-flight writer before deleting
            let _slot = handle.lock().await;
        }
        self.repository.delete(session)?;
        tracing::info!(target: "runtime::session", session, "closed session");
        Ok(())
    }

    pub async fn session_ids(&self) -> Vec<String> {
        self.store.session_ids().await
    }

    /// Stores `state` in the slot after letting enemies take their turns, and
    /// folds the resulting patch into the ledger.
    fn commit(
        &self,
        env: &CombatEnv<'_>,
        session: &str,
        slot: &mut SessionSlot,
        mut patch: LogPatch,
        mut state: CombatState,
    ) -> Committed {
        let enemy_up = state.active
            && state
                .upcoming_actor()
                .is_some_and(|actor| actor.side == Side::Enemy);
        if enemy_up {
            let run = run_enemy_turns(env, &mut state);
            tracing::debug!(target: "runtime::session", session, steps = run.steps, "enemy auto-play");
            patch.merge(run.patch, env.config.log_cap());
        }

        if slot.state.as_ref() != Some(&state) {
            self.persist(session, &state);
        }
        let active = state.active;
        slot.state = Some(state);
        Committed {
            patch: Some(slot.ledger.apply(patch)),
            active,
        }
    }

    /// Loads the persisted snapshot the first time a slot is locked.
    fn restore(&self, session: &str, slot: &mut SessionSlot) {
        if slot.restored {
            return;
        }
        slot.restored = true;

        match self.repository.load(session) {
            Ok(Some(state)) => {
                tracing::info!(
                    target: "runtime::session",
                    session,
                    active = state.active,
                    round = state.round,
                    "restored encounter snapshot"
                );
                slot.state = Some(state);
            }
            Ok(None) => {}
            Err(error) => {
                tracing::warn!(
                    target: "runtime::session",
                    session,
                    %error,
                    "unreadable snapshot, treating session as having no encounter"
                );
            }
        }
    }

    fn persist(&self, session: &str, state: &CombatState) {
        if !self.config.persist {
            return;
        }
        if let Err(error) = self.repository.save(session, state) {
            tracing::error!(
                target: "runtime::session",
                session,
                nonce = state.nonce,
                %error,
                "failed to persist encounter snapshot"
            );
        }
    }

    /// Publishes the patch and its facts, then asks the narrator for prose.
    async fn publish(&self, session: &str, patch: &LogPatch) -> (Vec<NarrationFact>, Option<String>) {
        let facts = extract_facts(patch, self.config.combat.fact_limit());
        self.bus.publish(Event::Patch {
            session: session.to_owned(),
            patch: patch.clone(),
        });
        if facts.is_empty() {
            return (facts, None);
        }

        self.bus.publish(Event::Facts {
            session: session.to_owned(),
            facts: facts.clone(),
        });
        let narration = self.narrator.narrate(session, &facts).await;
        if let Some(text) = &narration {
            self.bus.publish(Event::Narration {
                session: session.to_owned(),
                text: text.clone(),
            });
        }
        (facts, narration)
    }
}

impl std::fmt::Debug for EncounterService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncounterService")
            .field("config", &self.config)
            .field("policy", &self.policy)
            .field("bus", &self.bus)
            .finish_non_exhaustive()
    }
}

/// Session ids become file names, so only `[A-Za-z0-9_-]` is accepted.
fn validate_session_id(session: &str) -> Result<()> {
    let valid = !session.is_empty()
        && session
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(RuntimeError::InvalidSessionId(session.to_owned()))
    }
}

/// Builder for [`EncounterService`].
pub struct EncounterServiceBuilder {
    config: RuntimeConfig,
    store: Option<Arc<SessionStore>>,
    repository: Option<Arc<dyn SnapshotRepository>>,
    stats: Arc<dyn StatsOracle>,
    rng: Arc<dyn RngOracle>,
    policy: TrustPolicy,
    narrator: Arc<dyn Narrator>,
}

impl EncounterServiceBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            store: None,
            repository: None,
            stats: Arc::new(NoStats),
            rng: Arc::new(PcgRng),
            policy: TrustPolicy::default(),
            narrator: Arc::new(NullNarrator),
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Share a session store with other services.
    pub fn store(mut self, store: Arc<SessionStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the snapshot repository. Without one, `config.save_dir` selects a
    /// file repository and its absence an in-memory one.
    pub fn repository(mut self, repository: impl SnapshotRepository + 'static) -> Self {
        self.repository = Some(Arc::new(repository));
        self
    }

    pub fn stats(mut self, stats: impl StatsOracle + 'static) -> Self {
        self.stats = Arc::new(stats);
        self
    }

    /// Use a loaded content catalog as the stats oracle.
    pub fn catalog(self, catalog: ContentCatalog) -> Self {
        self.stats(catalog)
    }

    pub fn rng(mut self, rng: Arc<dyn RngOracle>) -> Self {
        self.rng = rng;
        self
    }

    pub fn policy(mut self, policy: TrustPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn narrator(mut self, narrator: impl Narrator + 'static) -> Self {
        self.narrator = Arc::new(narrator);
        self
    }

    pub fn build(self) -> Result<EncounterService> {
        let repository: Arc<dyn SnapshotRepository> = match (self.repository, &self.config.save_dir) {
            (Some(repository), _) => repository,
            (None, Some(dir)) => Arc::new(FileSnapshotRepository::new(dir)?),
            (None, None) => Arc::new(InMemorySnapshotRepo::new()),
        };
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(SessionStore::new(self.config.combat.log_cap())));

        tracing::info!(
            target: "runtime::session",
            persist = self.config.persist,
            save_dir = ?self.config.save_dir,
            "encounter service ready"
        );

        Ok(EncounterService {
            bus: EventBus::with_capacity(self.config.event_buffer_size),
            config: self.config,
            store,
            repository,
            stats: self.stats,
            rng: self.rng,
            policy: self.policy,
            narrator: self.narrator,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_ids_are_file_safe() {
        assert!(validate_session_id("table-1_b").is_ok());
        assert!(validate_session_id("").is_err());
        assert!(validate_session_id("../etc").is_err());
        assert!(validate_session_id("a b").is_err());
    }
}
