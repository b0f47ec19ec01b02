use bitflags::bitflags;
use strum::{AsRefStr, Display, EnumString};

/// Which side of the fight a combatant belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Side {
    Pc,
    Enemy,
}

impl Side {
    pub const fn opponent(self) -> Self {
        match self {
            Self::Pc => Self::Enemy,
            Self::Enemy => Self::Pc,
        }
    }
}

bitflags! {
    /// Transient per-turn flags, cleared when the owner's turn begins.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct TurnFlags: u8 {
        const DODGING     = 1 << 0;
        const DASHING     = 1 << 1;
        const DISENGAGING = 1 << 2;
        const USING_OBJECT = 1 << 3;
    }
}

/// A single participant of the encounter.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Combatant {
    pub key: String,
    pub name: String,
    pub side: Side,
    pub hp: i32,
    pub max_hp: i32,
    pub ac: i32,
    pub initiative: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub flags: TurnFlags,
    #[cfg_attr(feature = "serde", serde(default))]
    pub escaped: bool,
    /// Equipment/stat profile id used for weapon lookups. Never narrated.
    #[cfg_attr(feature = "serde", serde(default))]
    pub profile: Option<String>,
}

impl Combatant {
    /// Creates a combatant at full hit points. `max_hp` is raised to at least 1.
    pub fn new(
        key: impl Into<String>,
        name: impl Into<String>,
        side: Side,
        max_hp: i32,
        ac: i32,
        initiative: i32,
    ) -> Self {
        let max_hp = max_hp.max(1);
        Self {
            key: key.into(),
            name: name.into(),
            side,
            hp: max_hp,
            max_hp,
            ac,
            initiative,
            flags: TurnFlags::empty(),
            escaped: false,
            profile: None,
        }
    }

    /// Sets current hit points, clamped into `[0, max_hp]`.
    #[must_use]
    pub fn with_hp(mut self, hp: i32) -> Self {
        self.hp = hp.clamp(0, self.max_hp);
        self
    }

    #[must_use]
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    pub fn is_down(&self) -> bool {
        self.hp <= 0
    }

    /// Still in the fight (has not escaped), whether standing or down.
    pub fn is_present(&self) -> bool {
        !self.escaped
    }

    /// Standing and present: may take a turn and keeps its side alive.
    pub fn can_act(&self) -> bool {
        !self.is_down() && self.is_present()
    }
}

/// Party member supplied by the session layer, seeded into new encounters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PartyMember {
    pub key: String,
    pub name: String,
    pub hp: i32,
    pub max_hp: i32,
    pub ac: i32,
    pub initiative: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub profile: Option<String>,
}

impl PartyMember {
    pub fn to_combatant(&self) -> Combatant {
        let mut combatant = Combatant::new(
            self.key.clone(),
            self.name.clone(),
            Side::Pc,
            self.max_hp,
            self.ac,
            self.initiative,
        )
        .with_hp(self.hp);
        combatant.profile = self.profile.clone();
        combatant
    }
}
