use std::collections::BTreeMap;

use bitflags::bitflags;

use super::{DirectiveSource, DirectiveTag, StartCause};

bitflags! {
    /// Set of directive kinds a start cause permits.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct DirectiveKinds: u8 {
        const START        = 1 << 0;
        const ENEMY_ADD    = 1 << 1;
        const END          = 1 << 2;
        const RANDOM_EVENT = 1 << 3;
    }
}

impl DirectiveKinds {
    pub const fn of(tag: DirectiveTag) -> Self {
        match tag {
            DirectiveTag::Start => Self::START,
            DirectiveTag::EnemyAdd => Self::ENEMY_ADD,
            DirectiveTag::End => Self::END,
            DirectiveTag::RandomEvent => Self::RANDOM_EVENT,
        }
    }
}

/// Which directives each start cause may trigger, plus the source rule that
/// keeps generated text from claiming a trusted cause.
///
/// `END` and `RANDOM_EVENT` are granted to every cause; the table only
/// decides `START` and `ENEMY_ADD`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrustPolicy {
    table: BTreeMap<StartCause, DirectiveKinds>,
}

impl TrustPolicy {
    const ALWAYS: DirectiveKinds = DirectiveKinds::END.union(DirectiveKinds::RANDOM_EVENT);

    /// Policy that trusts nothing but ending encounters and random events.
    pub fn locked() -> Self {
        Self {
            table: BTreeMap::new(),
        }
    }

    /// Grants `kinds` to `cause`, replacing any earlier grant.
    #[must_use]
    pub fn allow(mut self, cause: StartCause, kinds: DirectiveKinds) -> Self {
        self.table.insert(cause, kinds);
        self
    }

    pub fn kinds_for(&self, cause: StartCause) -> DirectiveKinds {
        self.table.get(&cause).copied().unwrap_or_default() | Self::ALWAYS
    }

    pub fn permits(&self, cause: StartCause, tag: DirectiveTag) -> bool {
        self.kinds_for(cause).contains(DirectiveKinds::of(tag))
    }

    /// Cause as seen by the policy. Generated text is always `narrative`.
    pub fn effective_cause(&self, source: DirectiveSource, cause: StartCause) -> StartCause {
        match source {
            DirectiveSource::Generator => StartCause::Narrative,
            DirectiveSource::Admin | DirectiveSource::System => cause,
        }
    }
}

impl Default for TrustPolicy {
    /// Administrator and bootstrap-recovery starts are trusted.
    fn default() -> Self {
        Self::locked()
            .allow(StartCause::Admin, DirectiveKinds::all())
            .allow(StartCause::Bootstrap, DirectiveKinds::all())
    }
}
