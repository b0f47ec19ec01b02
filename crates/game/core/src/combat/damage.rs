//! Damage rolls.

use crate::env::{AttackProfile, RngOracle};

/// Rolled damage before it is applied to a target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DamageRoll {
    pub faces: Vec<u32>,
    pub dice_total: i32,
    pub bonus: i32,
    /// `max(0, dice_total + bonus)`.
    pub total: i32,
}

impl DamageRoll {
    /// Rolls the profile's dice (doubled on a critical) plus its flat bonus.
    ///
    /// `seed_for` maps a die index to the seed of that die.
    pub fn roll(
        rng: &dyn RngOracle,
        profile: &AttackProfile,
        critical: bool,
        seed_for: impl Fn(u32) -> u64,
    ) -> Self {
        let count = if critical {
            profile.dice.count.saturating_mul(2)
        } else {
            profile.dice.count
        };
        let faces: Vec<u32> = (0..count)
            .map(|index| rng.roll_die(seed_for(index), profile.dice.sides))
            .collect();
        let dice_total = faces.iter().map(|face| *face as i32).sum::<i32>();
        Self {
            faces,
            dice_total,
            bonus: profile.damage_bonus,
            total: (dice_total + profile.damage_bonus).max(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{DamageType, Dice, ScriptedRng};

    fn profile(bonus: i32) -> AttackProfile {
        AttackProfile::new(5, Dice::new(1, 8), bonus, DamageType::Slashing)
    }

    #[test]
    fn adds_flat_bonus() {
        let rng = ScriptedRng::new([4]);
        let roll = DamageRoll::roll(&rng, &profile(2), false, |i| i as u64);
        assert_eq!(roll.dice_total, 4);
        assert_eq!(roll.total, 6);
    }

    #[test]
    fn critical_doubles_dice_not_bonus() {
        let rng = ScriptedRng::new([3, 5]);
        let roll = DamageRoll::roll(&rng, &profile(2), true, |i| i as u64);
        assert_eq!(roll.faces, vec![3, 5]);
        assert_eq!(roll.total, 10);
    }

    #[test]
    fn negative_bonus_never_heals() {
        let rng = ScriptedRng::new([1]);
        let roll = DamageRoll::roll(&rng, &profile(-4), false, |i| i as u64);
        assert_eq!(roll.total, 0);
    }
}
