//! RNG oracle for deterministic dice rolls.
//!
//! Every roll is derived from `(encounter seed, nonce, actor slot, roll
//! context)`, so replaying an encounter from a snapshot with the same
//! oracle reproduces the same results.

use std::collections::VecDeque;
use std::sync::Mutex;

/// RNG oracle for deterministic random number generation.
///
/// Implementations must be deterministic and produce the same values
/// given the same seed.
pub trait RngOracle: Send + Sync {
    /// Generate a random u32 value from a seed.
    fn next_u32(&self, seed: u64) -> u32;

    /// Roll a die with N sides (1-N inclusive).
    fn roll_die(&self, seed: u64, sides: u32) -> u32 {
        if sides == 0 {
            return 0;
        }
        (self.next_u32(seed) % sides) + 1
    }

    /// Roll a d20.
    fn roll_d20(&self, seed: u64) -> u32 {
        self.roll_die(seed, 20)
    }
}

/// PCG random number generator (Permuted Congruential Generator).
///
/// PCG-XSH-RR variant: 32-bit output from 64-bit state.
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    #[inline]
    fn step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    #[inline]
    fn output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&self, seed: u64) -> u32 {
        Self::output(Self::step(seed))
    }
}

/// Distinguishes independent rolls made for the same actor within one action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum RollContext {
    ToHit = 0,
    ToHitSecond = 1,
    Escape = 2,
    EscapeSecond = 3,
    Initiative = 4,
    /// Damage dice are seeded from this offset plus the die index.
    Damage = 16,
}

impl RollContext {
    pub const fn id(self) -> u32 {
        self as u32
    }
}

/// Compute deterministic seed from encounter state components.
///
/// * `encounter_seed` - base seed fixed when the encounter starts
/// * `nonce` - action sequence number (increments each resolved action)
/// * `actor_slot` - stable slot of the rolling combatant, see [`actor_slot`]
/// * `context` - distinguishes multiple rolls in the same action
pub fn compute_seed(encounter_seed: u64, nonce: u64, actor_slot: u32, context: u32) -> u64 {
    // SplitMix64 / FxHash style multipliers
    let mut hash = encounter_seed;
    hash ^= nonce.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= (actor_slot as u64).wrapping_mul(0x517cc1b727220a95);
    hash ^= (context as u64).wrapping_mul(0x85ebca6b);

    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;

    hash
}

/// Stable 32-bit slot for a combatant key (FNV-1a).
pub fn actor_slot(key: &str) -> u32 {
    let mut hash: u32 = 0x811c9dc5;
    for byte in key.as_bytes() {
        hash ^= u32::from(*byte);
        hash = hash.wrapping_mul(0x01000193);
    }
    hash
}

/// Oracle that replays a fixed queue of die faces before falling back to PCG.
///
/// Scripted faces are clamped into `1..=sides` of the die being rolled. Used
/// to force specific outcomes in tests and demos.
#[derive(Debug, Default)]
pub struct ScriptedRng {
    faces: Mutex<VecDeque<u32>>,
    fallback: PcgRng,
}

impl ScriptedRng {
    pub fn new(faces: impl IntoIterator<Item = u32>) -> Self {
        Self {
            faces: Mutex::new(faces.into_iter().collect()),
            fallback: PcgRng,
        }
    }

    /// Appends more faces to the end of the script.
    pub fn push(&self, faces: impl IntoIterator<Item = u32>) {
        if let Ok(mut queue) = self.faces.lock() {
            queue.extend(faces);
        }
    }

    /// Number of scripted faces not yet consumed.
    pub fn remaining(&self) -> usize {
        self.faces.lock().map(|queue| queue.len()).unwrap_or(0)
    }

    fn pop(&self) -> Option<u32> {
        self.faces.lock().ok().and_then(|mut queue| queue.pop_front())
    }
}

impl RngOracle for ScriptedRng {
    fn next_u32(&self, seed: u64) -> u32 {
        match self.pop() {
            Some(face) => face.saturating_sub(1),
            None => self.fallback.next_u32(seed),
        }
    }

    fn roll_die(&self, seed: u64, sides: u32) -> u32 {
        if sides == 0 {
            return 0;
        }
        match self.pop() {
            Some(face) => face.clamp(1, sides),
            None => self.fallback.roll_die(seed, sides),
        }
    }
}
