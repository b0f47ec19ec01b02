//! Machine directives embedded in free narrative text.
//!
//! Text from an administrator, the narrative generator or the system may carry
//! bracketed tokens such as `@@COMBAT_START(cause=admin)`. The [`parse`]
//! step lifts them out of the visible text; the [`DirectiveApplier`] then
//! mutates the encounter, gated by a [`TrustPolicy`].
//!
//! Generated text is untrusted: it can end an encounter or log a random event,
//! but it can never start one on its own.
mod apply;
mod error;
mod heuristic;
mod parser;
mod policy;

use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

pub use apply::{DirectiveApplier, DirectiveOutcome, DirectiveReport, IgnoreReason, IgnoredDirective};
pub use error::DirectiveError;
pub use heuristic::looks_like_combat;
pub use parser::{ParsedText, parse};
pub use policy::{DirectiveKinds, TrustPolicy};

use crate::engine::EncounterOutcome;

/// Why an encounter is being started.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString, AsRefStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum StartCause {
    /// Explicit operator request.
    Admin,
    /// Recovery path when generated text reads like a fight.
    Bootstrap,
    Narrative,
    Ambush,
    Encounter,
}

/// Who produced the text a directive was found in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DirectiveSource {
    Admin,
    /// The external narrative generator. Never trusted to start an encounter.
    Generator,
    System,
}

/// Token name of each directive, as written after the `@@` marker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter, AsRefStr)]
pub enum DirectiveTag {
    #[strum(serialize = "COMBAT_START")]
    Start,
    #[strum(serialize = "COMBAT_ENEMY_ADD")]
    EnemyAdd,
    #[strum(serialize = "COMBAT_END")]
    End,
    #[strum(serialize = "RANDOM_EVENT")]
    RandomEvent,
}

impl DirectiveTag {
    /// Tag whose name, followed by `(`, starts `rest`.
    pub(crate) fn match_at(rest: &str) -> Option<Self> {
        Self::iter().find(|tag| {
            rest.strip_prefix(tag.as_ref())
                .is_some_and(|after| after.starts_with('('))
        })
    }
}

/// One enemy to add to the roster. Missing numbers are filled from the
/// enemy catalog and then from configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnemyDescriptor {
    pub id: Option<String>,
    pub name: String,
    pub hp: Option<i32>,
    pub ac: Option<i32>,
    pub init_mod: Option<i32>,
    pub threat: Option<i32>,
    pub profile: Option<String>,
}

impl EnemyDescriptor {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Expands `count` copies with `_N` id and ` N` name suffixes.
    pub(crate) fn expand(self, count: u32) -> Vec<Self> {
        if count <= 1 {
            return vec![self];
        }
        (1..=count)
            .map(|n| Self {
                id: self.id.as_ref().map(|id| format!("{id}_{n}")),
                name: format!("{} {n}", self.name),
                ..self.clone()
            })
            .collect()
    }
}

/// A typed machine command.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum Directive {
    Start {
        cause: StartCause,
        zone: Option<String>,
        surprise: Option<String>,
    },
    EnemyAdd {
        enemies: Vec<EnemyDescriptor>,
    },
    End {
        result: Option<EncounterOutcome>,
    },
    RandomEvent {
        key: String,
        category: Option<String>,
        severity: Option<i32>,
    },
}

impl Directive {
    pub const fn tag(&self) -> DirectiveTag {
        match self {
            Self::Start { .. } => DirectiveTag::Start,
            Self::EnemyAdd { .. } => DirectiveTag::EnemyAdd,
            Self::End { .. } => DirectiveTag::End,
            Self::RandomEvent { .. } => DirectiveTag::RandomEvent,
        }
    }
}
