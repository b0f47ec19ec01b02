//! Applies parsed directives to the session's encounter.

use core::fmt;

use super::{
    Directive, DirectiveError, DirectiveSource, DirectiveTag, EnemyDescriptor, StartCause,
    looks_like_combat, parse,
};
use super::policy::TrustPolicy;
use crate::engine::CombatEngine;
use crate::env::{CombatEnv, RollContext, actor_slot, compute_seed};
use crate::error::GameError;
use crate::log::{LineEvent, LineKind, LogPatch, LogPatchBuilder};
use crate::state::{CombatState, Combatant, PartyMember, Side};

/// Why a well-formed directive had no effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The start cause is not trusted for this source.
    UntrustedCause {
        cause: StartCause,
        source: DirectiveSource,
    },
    /// Another start in the same batch was already honored.
    DuplicateStart,
    /// Enemies may only join alongside an honored start.
    NoHonoredStart,
    NoActiveEncounter,
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UntrustedCause { cause, source } => {
                write!(f, "cause `{cause}` is not trusted from {source} text")
            }
            Self::DuplicateStart => f.write_str("a start was already honored in this batch"),
            Self::NoHonoredStart => f.write_str("no honored start in the same batch"),
            Self::NoActiveEncounter => f.write_str("no active encounter"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IgnoredDirective {
    pub directive: Directive,
    pub reason: IgnoreReason,
}

/// Everything that happened to the directives of one text.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DirectiveReport {
    pub honored: Vec<Directive>,
    pub ignored: Vec<IgnoredDirective>,
    pub malformed: Vec<DirectiveError>,
    /// Text with directive tokens removed, safe to show to players.
    pub visible_text: String,
    /// A minimal encounter was started from combat-like generated text.
    pub bootstrapped: bool,
}

/// Result of applying one text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectiveOutcome {
    /// Encounter after application; equals the input when nothing was honored.
    pub state: Option<CombatState>,
    /// `None` when the encounter and the log are unchanged.
    pub patch: Option<LogPatch>,
    pub report: DirectiveReport,
}

/// Applies directive batches under a [`TrustPolicy`].
///
/// Batch order: the first honored `Start` runs first, then every other
/// directive in text order.
pub struct DirectiveApplier<'a> {
    env: &'a CombatEnv<'a>,
    policy: &'a TrustPolicy,
}

impl<'a> DirectiveApplier<'a> {
    pub fn new(env: &'a CombatEnv<'a>, policy: &'a TrustPolicy) -> Self {
        Self { env, policy }
    }

    /// Parses `text` and applies its directives to a copy of `current`.
    ///
    /// `party` is seeded into every encounter started by this call.
    pub fn apply(
        &self,
        source: DirectiveSource,
        text: &str,
        party: &[PartyMember],
        current: Option<&CombatState>,
    ) -> DirectiveOutcome {
        let parsed = parse(text);
        let had_tokens = parsed.had_tokens();
        for error in &parsed.malformed {
            tracing::warn!(
                target: "encounter::directive",
                %source,
                code = error.error_code(),
                %error,
                "malformed directive"
            );
        }

        let mut report = DirectiveReport {
            visible_text: parsed.visible_text,
            malformed: parsed.malformed,
            ..DirectiveReport::default()
        };
        let mut state = current.cloned();
        let mut log = LogPatchBuilder::new(self.env.config.log_cap());
        let mut touched = false;

        let start_index = parsed.directives.iter().position(|directive| match directive {
            Directive::Start { cause, .. } => self.permits(source, *cause, DirectiveTag::Start),
            _ => false,
        });
        let mut start_cause = None;
        if let Some(index) = start_index
            && let Directive::Start { cause, zone, .. } = &parsed.directives[index]
        {
            state = Some(self.start(*cause, zone.as_deref(), party, state.as_ref(), &mut log));
            report.honored.push(parsed.directives[index].clone());
            start_cause = Some(*cause);
            touched = true;
        }

        for (index, directive) in parsed.directives.into_iter().enumerate() {
            if Some(index) == start_index {
                continue;
            }

            let verdict = match &directive {
                Directive::Start { cause, .. } => Err(if start_index.is_some() {
                    IgnoreReason::DuplicateStart
                } else {
                    IgnoreReason::UntrustedCause {
                        cause: *cause,
                        source,
                    }
                }),
                Directive::EnemyAdd { enemies } => match (state.as_mut(), start_cause) {
                    (Some(state), Some(cause))
                        if self.permits(source, cause, DirectiveTag::EnemyAdd) =>
                    {
                        for descriptor in enemies {
                            self.add_enemy(state, descriptor, &mut log);
                        }
                        Ok(())
                    }
                    (Some(_), Some(cause)) => Err(IgnoreReason::UntrustedCause { cause, source }),
                    _ => Err(IgnoreReason::NoHonoredStart),
                },
                Directive::End { result } => match state.as_mut().filter(|state| state.active) {
                    Some(state) => {
                        CombatEngine::new(state).finish(*result, &mut log);
                        Ok(())
                    }
                    None => Err(IgnoreReason::NoActiveEncounter),
                },
                Directive::RandomEvent {
                    key,
                    category,
                    severity,
                } => {
                    log_random_event(key, category.as_deref(), *severity, &mut log);
                    Ok(())
                }
            };

            match verdict {
                Ok(()) => {
                    touched = true;
                    report.honored.push(directive);
                }
                Err(reason) => {
                    tracing::warn!(
                        target: "encounter::directive",
                        %source,
                        tag = %directive.tag(),
                        %reason,
                        "directive ignored"
                    );
                    report.ignored.push(IgnoredDirective { directive, reason });
                }
            }
        }

        if !had_tokens
            && source == DirectiveSource::Generator
            && !state.as_ref().is_some_and(|state| state.active)
            && self.policy.permits(StartCause::Bootstrap, DirectiveTag::Start)
            && self.policy.permits(StartCause::Bootstrap, DirectiveTag::EnemyAdd)
            && looks_like_combat(&report.visible_text)
        {
            let mut fresh = self.start(StartCause::Bootstrap, None, party, state.as_ref(), &mut log);
            let enemy = &self.env.config.bootstrap_enemy;
            let descriptor = EnemyDescriptor {
                id: Some(enemy.key.clone()),
                hp: Some(enemy.hp),
                ac: Some(enemy.ac),
                ..EnemyDescriptor::named(enemy.name.clone())
            };
            self.add_enemy(&mut fresh, &descriptor, &mut log);
            state = Some(fresh);
            report.bootstrapped = true;
            touched = true;
        }

        let patch = touched.then(|| log.build(state.as_ref()));
        DirectiveOutcome {
            state,
            patch,
            report,
        }
    }

    fn permits(&self, source: DirectiveSource, cause: StartCause, tag: DirectiveTag) -> bool {
        self.policy
            .permits(self.policy.effective_cause(source, cause), tag)
    }

    /// Fresh encounter with the party seeded. Replaces any previous one.
    fn start(
        &self,
        cause: StartCause,
        zone: Option<&str>,
        party: &[PartyMember],
        previous: Option<&CombatState>,
        log: &mut LogPatchBuilder,
    ) -> CombatState {
        let base = previous.map_or(0, |state| state.seed ^ state.nonce.rotate_left(32));
        let clock = self.env.now.timestamp_millis() as u64;
        let seed = compute_seed(base ^ clock, 0, actor_slot(cause.as_ref()), 0);

        let mut state = CombatState::new(seed, self.env.now);
        for member in party {
            state.upsert_pc(member);
        }

        log.set_reset();
        log.narrative(match zone {
            Some(zone) => format!("Combat begins at {zone}."),
            None => "Combat begins.".to_owned(),
        });
        tracing::info!(
            target: "encounter::directive",
            %cause,
            party = party.len(),
            replaced = previous.is_some_and(|state| state.active),
            "encounter started"
        );
        state
    }

    /// Adds one enemy, filling missing numbers from the catalog and then the
    /// configured defaults. Initiative is `d20 + init_mod`.
    fn add_enemy(
        &self,
        state: &mut CombatState,
        descriptor: &EnemyDescriptor,
        log: &mut LogPatchBuilder,
    ) {
        let stats = self.env.stats;
        let config = self.env.config;
        let template = descriptor
            .profile
            .as_deref()
            .and_then(|id| stats.enemy_template(id))
            .or_else(|| stats.enemy_template(&descriptor.name));

        let hp = descriptor
            .hp
            .or(template.as_ref().map(|t| t.hp))
            .unwrap_or(config.default_enemy_hp);
        let ac = descriptor
            .ac
            .or(template.as_ref().map(|t| t.ac))
            .unwrap_or(config.default_enemy_ac);
        let init_mod = descriptor
            .init_mod
            .or(template.as_ref().map(|t| t.init_mod))
            .unwrap_or(0);
        let profile = descriptor
            .profile
            .clone()
            .or_else(|| template.and_then(|t| t.profile));

        let slot_key = format!("{}#{}", descriptor.name, state.combatants.len());
        let seed = self
            .env
            .seed_for(state, &slot_key, RollContext::Initiative.id());
        let roll = self.env.rng.roll_d20(seed) as i32;
        let initiative = roll + init_mod;

        let mut combatant = Combatant::new(
            descriptor.id.clone().unwrap_or_default(),
            descriptor.name.clone(),
            Side::Enemy,
            hp,
            ac,
            initiative,
        );
        if let Some(profile) = profile {
            combatant = combatant.with_profile(profile);
        }
        let max_hp = combatant.max_hp;
        let key = state.add_enemy(combatant);

        tracing::debug!(
            target: "encounter::directive",
            enemy = %key,
            roll,
            init_mod,
            threat = descriptor.threat,
            "enemy joined"
        );
        log.event(
            LineKind::Mechanic,
            format!(
                "{} joins the fight (HP {max_hp}/{max_hp}, AC {ac}, initiative {initiative}).",
                descriptor.name
            ),
            LineEvent::EnemyJoined {
                name: descriptor.name.clone(),
            },
        );
    }
}

fn log_random_event(
    key: &str,
    category: Option<&str>,
    severity: Option<i32>,
    log: &mut LogPatchBuilder,
) {
    let detail = match (category, severity) {
        (Some(category), Some(severity)) => format!(" [{category}, severity {severity}]"),
        (Some(category), None) => format!(" [{category}]"),
        (None, Some(severity)) => format!(" [severity {severity}]"),
        (None, None) => String::new(),
    };
    log.event(
        LineKind::Narrative,
        format!("Random event: {key}{detail}."),
        LineEvent::RandomEvent {
            key: key.to_owned(),
            category: category.map(str::to_owned),
        },
    );
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};

    use super::*;
    use crate::config::CombatConfig;
    use crate::directive::DirectiveKinds;
    use crate::engine::EncounterOutcome;
    use crate::env::{EnemyTemplate, NoStats, ScriptedRng, StatsOracle};

    fn aria() -> PartyMember {
        PartyMember {
            key: "aria".into(),
            name: "Aria".into(),
            hp: 12,
            max_hp: 12,
            ac: 15,
            initiative: 15,
            profile: None,
        }
    }

    struct Bestiary;

    impl StatsOracle for Bestiary {
        fn attack_profile(&self, _combatant: &Combatant) -> Option<crate::env::AttackProfile> {
            None
        }

        fn enemy_template(&self, id: &str) -> Option<EnemyTemplate> {
            (id == "wolf").then(|| EnemyTemplate {
                name: "Wolf".into(),
                hp: 11,
                ac: 13,
                init_mod: 2,
                profile: Some("bite".into()),
            })
        }
    }

    #[test]
    fn admin_start_with_enemies_creates_an_encounter() {
        let config = CombatConfig::default();
        let rng = ScriptedRng::new([5]);
        let env = CombatEnv::new(&NoStats, &rng, &config, DateTime::<Utc>::UNIX_EPOCH);
        let policy = TrustPolicy::default();

        let text = "@@COMBAT_START(cause=admin)\n@@COMBAT_ENEMY_ADD(enemy_id=gob, name=Goblin, hp=7, ac=13, init_mod=2)\nThe goblin snarls.";
        let outcome = DirectiveApplier::new(&env, &policy).apply(
            DirectiveSource::Admin,
            text,
            &[aria()],
            None,
        );

        let state = outcome.state.expect("encounter started");
        assert!(state.active);
        assert_eq!(state.order, vec!["aria".to_owned(), "gob".to_owned()]);
        assert_eq!(state.combatant("gob").unwrap().initiative, 7);
        assert_eq!(outcome.report.honored.len(), 2);
        assert_eq!(outcome.report.visible_text, "The goblin snarls.");

        let patch = outcome.patch.expect("patch");
        assert!(patch.reset);
        assert!(patch.open);
        assert_eq!(patch.status, "⚔ Combat • Round 1 • Turn: Aria");
        assert_eq!(
            patch.lines[1].text,
            "Goblin joins the fight (HP 7/7, AC 13, initiative 7)."
        );
    }

    #[test]
    fn generator_start_is_ignored_even_with_admin_cause() {
        let config = CombatConfig::default();
        let rng = ScriptedRng::default();
        let env = CombatEnv::new(&NoStats, &rng, &config, DateTime::<Utc>::UNIX_EPOCH);
        let policy = TrustPolicy::default();

        let text = "@@COMBAT_START(cause=admin)\n@@COMBAT_ENEMY_ADD(name=Goblin)";
        let outcome = DirectiveApplier::new(&env, &policy).apply(
            DirectiveSource::Generator,
            text,
            &[aria()],
            None,
        );

        assert_eq!(outcome.state, None);
        assert_eq!(outcome.patch, None);
        assert_eq!(
            outcome.report.ignored[0].reason,
            IgnoreReason::UntrustedCause {
                cause: StartCause::Admin,
                source: DirectiveSource::Generator
            }
        );
        assert_eq!(outcome.report.ignored[1].reason, IgnoreReason::NoHonoredStart);
    }

    #[test]
    fn enemies_need_a_cause_that_grants_them() {
        let config = CombatConfig::default();
        let rng = ScriptedRng::default();
        let env = CombatEnv::new(&NoStats, &rng, &config, DateTime::<Utc>::UNIX_EPOCH);
        let policy = TrustPolicy::locked().allow(StartCause::Admin, DirectiveKinds::START);

        let text = "@@COMBAT_START(cause=admin)\n@@COMBAT_ENEMY_ADD(name=Goblin)\n@@RANDOM_EVENT(key=fog)";
        let outcome = DirectiveApplier::new(&env, &policy).apply(
            DirectiveSource::Admin,
            text,
            &[aria()],
            None,
        );

        let state = outcome.state.expect("start is still honored");
        assert_eq!(state.combatants.len(), 1);
        assert!(state.combatants.values().all(|c| c.side == Side::Pc));
        assert_eq!(outcome.report.honored.len(), 2);
        assert_eq!(
            outcome.report.ignored[0].reason,
            IgnoreReason::UntrustedCause {
                cause: StartCause::Admin,
                source: DirectiveSource::Admin
            }
        );
    }

    #[test]
    fn end_is_always_honored() {
        let config = CombatConfig::default();
        let rng = ScriptedRng::default();
        let env = CombatEnv::new(&NoStats, &rng, &config, DateTime::<Utc>::UNIX_EPOCH);
        let policy = TrustPolicy::default();
        let mut current = CombatState::new(1, DateTime::<Utc>::UNIX_EPOCH);
        current.upsert_pc(&aria());
        current.add_enemy(Combatant::new("gob", "Goblin", Side::Enemy, 7, 13, 10));

        let outcome = DirectiveApplier::new(&env, &policy).apply(
            DirectiveSource::Generator,
            "The goblin flees. @@COMBAT_END(result=victory)",
            &[],
            Some(&current),
        );

        let state = outcome.state.unwrap();
        assert!(!state.active);
        let patch = outcome.patch.unwrap();
        assert!(!patch.open);
        assert_eq!(patch.status, "Combat ended");
        assert!(patch.events().any(|event| matches!(
            event,
            LineEvent::EncounterEnded {
                outcome: Some(EncounterOutcome::Victory)
            }
        )));
    }

    #[test]
    fn end_without_encounter_is_reported() {
        let config = CombatConfig::default();
        let rng = ScriptedRng::default();
        let env = CombatEnv::new(&NoStats, &rng, &config, DateTime::<Utc>::UNIX_EPOCH);
        let policy = TrustPolicy::default();

        let outcome = DirectiveApplier::new(&env, &policy).apply(
            DirectiveSource::System,
            "@@COMBAT_END()",
            &[],
            None,
        );
        assert_eq!(outcome.patch, None);
        assert_eq!(outcome.report.ignored[0].reason, IgnoreReason::NoActiveEncounter);
    }

    #[test]
    fn catalog_fills_missing_numbers() {
        let config = CombatConfig::default();
        let rng = ScriptedRng::new([10, 10]);
        let env = CombatEnv::new(&Bestiary, &rng, &config, DateTime::<Utc>::UNIX_EPOCH);
        let policy = TrustPolicy::default();

        let text = "@@COMBAT_START(cause=admin)\n@@COMBAT_ENEMY_ADD(name=Wolf, profile=wolf)\n@@COMBAT_ENEMY_ADD(name=Shade)";
        let outcome = DirectiveApplier::new(&env, &policy).apply(DirectiveSource::Admin, text, &[], None);

        let state = outcome.state.unwrap();
        let wolf = state.in_order().find(|c| c.name == "Wolf").unwrap();
        assert_eq!((wolf.max_hp, wolf.ac, wolf.initiative), (11, 13, 12));
        assert_eq!(wolf.profile.as_deref(), Some("wolf"));
        let shade = state.in_order().find(|c| c.name == "Shade").unwrap();
        assert_eq!((shade.max_hp, shade.ac), (10, 10));
    }

    #[test]
    fn random_event_is_logged_only() {
        let config = CombatConfig::default();
        let rng = ScriptedRng::default();
        let env = CombatEnv::new(&NoStats, &rng, &config, DateTime::<Utc>::UNIX_EPOCH);
        let policy = TrustPolicy::default();

        let outcome = DirectiveApplier::new(&env, &policy).apply(
            DirectiveSource::Generator,
            "(@@RANDOM_EVENT(key=storm, category=weather, severity=2))\nWind howls.",
            &[],
            None,
        );
        assert_eq!(outcome.state, None);
        let patch = outcome.patch.unwrap();
        assert_eq!(patch.lines[0].text, "Random event: storm [weather, severity 2].");
        assert_eq!(outcome.report.visible_text, "Wind howls.");
    }

    #[test]
    fn combat_like_generator_text_bootstraps() {
        let config = CombatConfig::default();
        let rng = ScriptedRng::new([4]);
        let env = CombatEnv::new(&NoStats, &rng, &config, DateTime::<Utc>::UNIX_EPOCH);
        let policy = TrustPolicy::default();

        let applier = DirectiveApplier::new(&env, &policy);
        let outcome = applier.apply(
            DirectiveSource::Generator,
            "A bandit lunges from the reeds, blade drawn!",
            &[aria()],
            None,
        );
        assert!(outcome.report.bootstrapped);
        let state = outcome.state.unwrap();
        assert!(state.combatant("enemy_1").is_some());
        assert!(state.combatant("aria").is_some());

        let admin = applier.apply(
            DirectiveSource::Admin,
            "A bandit lunges from the reeds, blade drawn!",
            &[aria()],
            None,
        );
        assert!(!admin.report.bootstrapped);
        assert_eq!(admin.state, None);
    }

    #[test]
    fn start_replaces_previous_encounter() {
        let config = CombatConfig::default();
        let rng = ScriptedRng::default();
        let env = CombatEnv::new(&NoStats, &rng, &config, DateTime::<Utc>::UNIX_EPOCH);
        let policy = TrustPolicy::default();
        let mut current = CombatState::new(1, DateTime::<Utc>::UNIX_EPOCH);
        current.add_enemy(Combatant::new("old", "Old Foe", Side::Enemy, 7, 13, 10));

        let outcome = DirectiveApplier::new(&env, &policy).apply(
            DirectiveSource::Admin,
            "@@COMBAT_START(cause=admin)\n@@COMBAT_START(cause=admin)",
            &[aria()],
            Some(&current),
        );
        let state = outcome.state.unwrap();
        assert!(state.combatant("old").is_none());
        assert_eq!(outcome.report.ignored[0].reason, IgnoreReason::DuplicateStart);
    }
}
