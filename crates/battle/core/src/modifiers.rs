//! Capability seams for damage modifiers and class buffs.
//!
//! The engine and factory only talk to these traits, so tests (or alternative
//! balance tables) can swap the numbers without touching the rules.

use crate::class::{self, ClassLine, ClassSpec};
use crate::combatant::Buffs;
use crate::element::{self, Element};
use crate::rng::BattleRng;

/// Maps element and class state to damage multipliers.
pub trait ModifierResolver: Send + Sync {
    /// Signed elemental adjustment in `[-0.30, 0.30]`.
    fn elemental_modifier(&self, attacker: Element, defender: Element, rng: &mut dyn BattleRng) -> f64;

    /// Damage multiplier of a mage tier, for elemental attacks.
    fn mage_multiplier(&self, tier: u8) -> f64;
}

/// Resolves a participant's class list into combat buffs.
pub trait BuffProvider: Send + Sync {
    fn resolve_buffs(&self, classes: &[ClassSpec], has_shield: bool) -> Buffs;

    /// Max-hp multiplier granted by the class list.
    fn health_multiplier(&self, classes: &[ClassSpec], has_shield: bool) -> f64;
}

/// Table-driven resolver backed by [`element`] and [`class`].
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardResolver;

impl ModifierResolver for StandardResolver {
    fn elemental_modifier(&self, attacker: Element, defender: Element, rng: &mut dyn BattleRng) -> f64 {
        element::elemental_modifier(attacker, defender, rng)
    }

    fn mage_multiplier(&self, tier: u8) -> f64 {
        class::mage_multiplier(tier)
    }
}

/// Buff provider reading the class tables.
///
/// When a participant lists the same line twice, the highest tier wins.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClassBuffProvider;

impl ClassBuffProvider {
    fn best_tier(classes: &[ClassSpec], line: ClassLine) -> Option<u8> {
        classes
            .iter()
            .filter(|c| c.line == line && c.tier > 0)
            .map(|c| c.tier)
            .max()
    }
}

impl BuffProvider for ClassBuffProvider {
    fn resolve_buffs(&self, classes: &[ClassSpec], has_shield: bool) -> Buffs {
        let tank_tier = Self::best_tier(classes, ClassLine::Tank);
        let reflection = tank_tier
            .map(|tier| class::tank_profile(tier, has_shield).reflection_percent)
            .unwrap_or(0.0);

        Buffs {
            lifesteal_percent: Self::best_tier(classes, ClassLine::Reaper)
                .map_or(0.0, class::lifesteal_percent),
            death_cheat_chance: Self::best_tier(classes, ClassLine::Ritualist)
                .map_or(0.0, class::death_cheat_chance),
            mage_tier: Self::best_tier(classes, ClassLine::Mage),
            tank_tier,
            damage_reflection_percent: reflection,
            has_shield,
        }
    }

    fn health_multiplier(&self, classes: &[ClassSpec], has_shield: bool) -> f64 {
        Self::best_tier(classes, ClassLine::Tank)
            .map_or(1.0, |tier| class::tank_profile(tier, has_shield).health_multiplier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffs_pick_highest_tier_per_line() {
        let classes = [
            ClassSpec::new(ClassLine::Mage, 2),
            ClassSpec::new(ClassLine::Mage, 5),
            ClassSpec::new(ClassLine::Reaper, 1),
            ClassSpec::new(ClassLine::Other, 6),
        ];
        let buffs = ClassBuffProvider.resolve_buffs(&classes, false);
        assert_eq!(buffs.mage_tier, Some(5));
        assert_eq!(buffs.lifesteal_percent, 5.0);
        assert_eq!(buffs.death_cheat_chance, 0.0);
        assert_eq!(buffs.tank_tier, None);
    }

    #[test]
    fn reflection_requires_shield() {
        let classes = [ClassSpec::new(ClassLine::Tank, 3)];
        let shielded = ClassBuffProvider.resolve_buffs(&classes, true);
        let bare = ClassBuffProvider.resolve_buffs(&classes, false);
        assert_eq!(shielded.damage_reflection_percent, 9.0);
        assert_eq!(bare.damage_reflection_percent, 0.0);
        assert!(
            ClassBuffProvider.health_multiplier(&classes, true)
                > ClassBuffProvider.health_multiplier(&classes, false)
        );
    }
}
