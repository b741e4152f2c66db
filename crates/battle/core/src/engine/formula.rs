//! Raw damage formulas, one per [`DamageStrategy`].
//!
//! [`DamageStrategy`]: crate::config::DamageStrategy

use crate::combatant::Combatant;
use crate::config::BattleConfig;
use crate::element::{Affinity, Element};
use crate::modifiers::ModifierResolver;
use crate::rng::BattleRng;

/// Random swing added to raw power by the simple formula.
pub const SIMPLE_SWING: (u32, u32) = (1, 7);

/// Raw damage before death-cheat, lifesteal and reflection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RawDamage {
    pub amount: f64,
    pub element: Element,
    pub affinity: Affinity,
}

/// Simple formula.
///
/// ```text
/// raw    = actor.damage + uniform_int(1..=7)
/// damage = max(1, raw - target.armor)
/// ```
pub fn simple_damage(actor: &Combatant, target: &Combatant, rng: &mut dyn BattleRng) -> RawDamage {
    let swing = rng.range_inclusive(SIMPLE_SWING.0, SIMPLE_SWING.1);
    let raw = actor.damage + f64::from(swing);
    RawDamage {
        amount: round2((raw - target.armor).max(1.0)),
        element: actor.attack_element,
        affinity: Affinity::Neutral,
    }
}

/// Elemental formula.
///
/// ```text
/// base    = max(1, actor.damage - target.armor)
/// damage  = base
///         × (1 + elemental_modifier)      if element_effects
///         × mage_multiplier(tier)         if class_buffs and element ≠ Unknown
///         × (0.9 + luck / 500)            if luck_effects
/// ```
///
/// The attack element is drawn from the actor's dual pair when it has one,
/// alternating each call.
pub fn elemental_damage(
    actor: &mut Combatant,
    target: &Combatant,
    config: &BattleConfig,
    resolver: &dyn ModifierResolver,
    rng: &mut dyn BattleRng,
) -> RawDamage {
    let element = actor.next_attack_element();
    let mut amount = (actor.damage - target.armor).max(1.0);
    let mut affinity = Affinity::Neutral;

    if config.element_effects {
        affinity = element.affinity_against(target.defense_element);
        amount *= 1.0 + resolver.elemental_modifier(element, target.defense_element, rng);
    }

    if config.class_buffs
        && element != Element::Unknown
        && let Some(tier) = actor.buffs.mage_tier
    {
        amount *= resolver.mage_multiplier(tier);
    }

    if config.luck_effects {
        amount *= luck_multiplier(actor.luck);
    }

    RawDamage {
        amount: round2(amount.max(1.0)),
        element,
        affinity,
    }
}

/// `0.9` at luck 0, `1.0` at luck 50, `1.1` at luck 100.
pub fn luck_multiplier(luck: f64) -> f64 {
    0.9 + luck.clamp(0.0, 100.0) / 500.0
}

/// Round to two decimals, the precision hp is tracked at.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle_type::BattleType;
    use crate::combatant::CombatantId;
    use crate::modifiers::StandardResolver;
    use crate::rng::FixedRng;

    fn fighter(damage: f64, armor: f64, element: Element) -> Combatant {
        Combatant::new(CombatantId::Monster("f".into()), "F", 100.0, damage, armor)
            .with_elements(element, element)
    }

    #[test]
    fn simple_formula_adds_swing_before_armor() {
        let a = fighter(10.0, 0.0, Element::Fire);
        let b = fighter(10.0, 12.0, Element::Nature);
        let low = simple_damage(&a, &b, &mut FixedRng::constant(0.0));
        let high = simple_damage(&a, &b, &mut FixedRng::constant(1.0));
        assert_eq!(low.amount, 1.0);
        assert_eq!(high.amount, 5.0);
    }

    #[test]
    fn elemental_formula_floors_at_one() {
        let mut a = fighter(5.0, 0.0, Element::Unknown);
        let b = fighter(5.0, 50.0, Element::Unknown);
        let config = BattleConfig::defaults(BattleType::Duel);
        let raw = elemental_damage(&mut a, &b, &config, &StandardResolver, &mut FixedRng::constant(0.5));
        assert_eq!(raw.amount, 1.0);
    }

    #[test]
    fn mage_multiplier_needs_an_element() {
        let config = BattleConfig::defaults(BattleType::Duel);
        let mut plain = fighter(20.0, 0.0, Element::Unknown);
        plain.buffs.mage_tier = Some(6);
        let target = fighter(0.0, 0.0, Element::Unknown);
        let raw = elemental_damage(&mut plain, &target, &config, &StandardResolver, &mut FixedRng::constant(0.5));
        assert_eq!(raw.amount, 20.0);

        let mut mage = fighter(20.0, 0.0, Element::Fire);
        mage.buffs.mage_tier = Some(6);
        let raw = elemental_damage(&mut mage, &target, &config, &StandardResolver, &mut FixedRng::constant(0.5));
        assert_eq!(raw.amount, 40.0);
    }

    #[test]
    fn luck_scales_linearly() {
        assert_eq!(luck_multiplier(50.0), 1.0);
        assert!((luck_multiplier(0.0) - 0.9).abs() < 1e-9);
        assert!((luck_multiplier(250.0) - 1.1).abs() < 1e-9);
    }
}
