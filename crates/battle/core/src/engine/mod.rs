//! Combat resolution engine.
//!
//! Resolves one action (actor hits target) and mutates both combatants. The
//! pipeline is the same for both damage strategies once raw damage is known:
//!
//! 1. raw damage ([`formula::simple_damage`] or [`formula::elemental_damage`])
//! 2. death-cheat: a lethal hit may leave the target at 1 hp, once per battle
//! 3. `apply_damage` on the target
//! 4. lifesteal: actor heals a share of the damage dealt
//! 5. reflection: a shielded tank sends a share back to the actor
//!
//! All randomness flows through the injected [`BattleRng`].

mod event;
pub mod formula;

pub use event::{Slot, TurnEffect, TurnEvent};
pub use formula::{RawDamage, round2};

use crate::combatant::Combatant;
use crate::config::{BattleConfig, DamageStrategy};
use crate::element::{Affinity, Element};
use crate::modifiers::ModifierResolver;
use crate::rng::BattleRng;

/// Result of resolving a single action.
#[derive(Clone, Debug, PartialEq)]
pub struct Resolution {
    pub element: Element,
    /// Hp actually removed from the target.
    pub damage: f64,
    pub effects: Vec<TurnEffect>,
}

/// Stateless resolver bound to one battle's config and modifier tables.
pub struct CombatEngine<'a> {
    config: &'a BattleConfig,
    resolver: &'a dyn ModifierResolver,
}

impl<'a> CombatEngine<'a> {
    pub fn new(config: &'a BattleConfig, resolver: &'a dyn ModifierResolver) -> Self {
        Self { config, resolver }
    }

    /// Resolve `actor` hitting `target`.
    pub fn resolve(
        &self,
        actor: &mut Combatant,
        target: &mut Combatant,
        rng: &mut dyn BattleRng,
    ) -> Resolution {
        let raw = match self.config.damage_strategy {
            DamageStrategy::Simple => formula::simple_damage(actor, target, rng),
            DamageStrategy::Elemental => {
                formula::elemental_damage(actor, target, self.config, self.resolver, rng)
            }
        };

        let mut effects = Vec::new();
        match raw.affinity {
            Affinity::Counter => effects.push(TurnEffect::Countered),
            Affinity::Countered => effects.push(TurnEffect::Resisted),
            Affinity::Neutral => {}
        }

        let dealt = self.strike(target, raw.amount, rng, &mut effects);

        if self.config.lifesteal && actor.buffs.lifesteal_percent > 0.0 && dealt > 0.0 {
            let healed = actor.heal(round2(dealt * actor.buffs.lifesteal_percent / 100.0));
            if healed > 0.0 {
                effects.push(TurnEffect::Lifesteal { amount: healed });
            }
        }

        if let Some(reflected) = self.reflection(target, dealt) {
            let taken = actor.apply_damage(reflected);
            if taken > 0.0 {
                effects.push(TurnEffect::Reflected { amount: taken });
                if !actor.is_alive() {
                    effects.push(TurnEffect::ActorKilled);
                }
            }
        }

        tracing::trace!(
            target: "battle::engine",
            actor = %actor.id,
            target_id = %target.id,
            raw = raw.amount,
            dealt,
            "resolved action"
        );

        Resolution {
            element: raw.element,
            damage: dealt,
            effects,
        }
    }

    /// Apply `amount` to `target`, giving it a chance to cheat death.
    fn strike(
        &self,
        target: &mut Combatant,
        amount: f64,
        rng: &mut dyn BattleRng,
        effects: &mut Vec<TurnEffect>,
    ) -> f64 {
        let lethal = amount >= target.hp();
        if lethal
            && self.config.death_cheat
            && target.is_alive()
            && target.can_cheat_death()
            && rng.chance(target.buffs.death_cheat_chance)
        {
            effects.push(TurnEffect::DeathCheated);
            return target.cheat_death();
        }

        let dealt = target.apply_damage(amount);
        if !target.is_alive() && dealt > 0.0 {
            effects.push(TurnEffect::Killed);
        }
        dealt
    }

    /// Damage reflected back by a shielded tank, if any.
    fn reflection(&self, target: &Combatant, dealt: f64) -> Option<f64> {
        let buffs = &target.buffs;
        if !self.config.reflection
            || !buffs.has_shield
            || buffs.tank_tier.is_none()
            || dealt <= 0.0
        {
            return None;
        }
        let percent = buffs.damage_reflection_percent;
        (percent > 0.0).then(|| round2(dealt * percent / 100.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle_type::BattleType;
    use crate::combatant::{Buffs, CombatantId};
    use crate::config::SettingKey;
    use crate::modifiers::StandardResolver;
    use crate::rng::{FixedRng, SeededRng};
    use serde_json::json;

    fn fighter(name: &str, hp: f64, damage: f64, armor: f64, element: Element) -> Combatant {
        Combatant::new(CombatantId::Monster(name.into()), name, hp, damage, armor)
            .with_elements(element, element)
    }

    fn config(battle_type: BattleType) -> BattleConfig {
        BattleConfig::defaults(battle_type)
    }

    #[test]
    fn fire_hits_nature_within_counter_band() {
        let config = config(BattleType::Duel);
        let engine = CombatEngine::new(&config, &StandardResolver);
        for seed in 0..200 {
            let mut a = fighter("A", 100.0, 30.0, 10.0, Element::Fire);
            let mut b = fighter("B", 100.0, 20.0, 5.0, Element::Nature);
            let res = engine.resolve(&mut a, &mut b, &mut SeededRng::new(seed));
            assert!((67.5..=72.5).contains(&b.hp()), "hp {}", b.hp());
            assert_eq!(a.hp(), 100.0);
            assert!(res.effects.contains(&TurnEffect::Countered));
        }
    }

    #[test]
    fn death_cheat_fires_once() {
        let config = config(BattleType::Duel);
        let engine = CombatEngine::new(&config, &StandardResolver);
        let mut a = fighter("A", 100.0, 500.0, 0.0, Element::Unknown);
        let mut b = fighter("B", 50.0, 1.0, 0.0, Element::Unknown).with_buffs(Buffs {
            death_cheat_chance: 100.0,
            ..Buffs::default()
        });

        let first = engine.resolve(&mut a, &mut b, &mut FixedRng::constant(0.0));
        assert!(first.effects.contains(&TurnEffect::DeathCheated));
        assert_eq!(b.hp(), 1.0);
        assert_eq!(first.damage, 49.0);

        let second = engine.resolve(&mut a, &mut b, &mut FixedRng::constant(0.0));
        assert!(second.effects.contains(&TurnEffect::Killed));
        assert!(!b.is_alive());
    }

    #[test]
    fn death_cheat_rate_tracks_chance() {
        let config = config(BattleType::Duel);
        let engine = CombatEngine::new(&config, &StandardResolver);
        let mut rng = SeededRng::new(2024);
        let trials = 10_000;
        let mut cheated = 0;

        for _ in 0..trials {
            let mut a = fighter("A", 100.0, 1_000.0, 0.0, Element::Unknown);
            let mut b = fighter("B", 100.0, 1.0, 0.0, Element::Unknown).with_buffs(Buffs {
                death_cheat_chance: 50.0,
                ..Buffs::default()
            });
            if engine
                .resolve(&mut a, &mut b, &mut rng)
                .effects
                .contains(&TurnEffect::DeathCheated)
            {
                cheated += 1;
                // A second lethal hit always lands.
                engine.resolve(&mut a, &mut b, &mut rng);
                assert!(!b.is_alive());
            }
        }

        let rate = f64::from(cheated) / f64::from(trials);
        assert!((0.47..=0.53).contains(&rate), "rate {rate}");
    }

    #[test]
    fn death_cheat_respects_setting() {
        let config = BattleConfig::resolve(BattleType::Duel, |key| {
            (key == SettingKey::DeathCheat).then(|| json!(false))
        })
        .unwrap();
        let engine = CombatEngine::new(&config, &StandardResolver);
        let mut a = fighter("A", 100.0, 500.0, 0.0, Element::Unknown);
        let mut b = fighter("B", 50.0, 1.0, 0.0, Element::Unknown).with_buffs(Buffs {
            death_cheat_chance: 100.0,
            ..Buffs::default()
        });
        engine.resolve(&mut a, &mut b, &mut FixedRng::constant(0.0));
        assert!(!b.is_alive());
        assert!(!b.has_cheated_death());
    }

    #[test]
    fn lifesteal_heals_actor_up_to_max() {
        let config = config(BattleType::Duel);
        let engine = CombatEngine::new(&config, &StandardResolver);
        let mut a = fighter("A", 100.0, 40.0, 0.0, Element::Unknown).with_buffs(Buffs {
            lifesteal_percent: 50.0,
            ..Buffs::default()
        });
        a.apply_damage(10.0);
        let mut b = fighter("B", 100.0, 1.0, 0.0, Element::Unknown);

        let res = engine.resolve(&mut a, &mut b, &mut FixedRng::constant(0.5));
        assert_eq!(res.damage, 40.0);
        assert_eq!(a.hp(), 100.0);
        assert!(res.effects.contains(&TurnEffect::Lifesteal { amount: 10.0 }));
    }

    #[test]
    fn shielded_tank_reflects_damage() {
        let config = config(BattleType::Duel);
        let engine = CombatEngine::new(&config, &StandardResolver);
        let mut a = fighter("A", 100.0, 60.0, 0.0, Element::Unknown);
        let mut b = fighter("B", 200.0, 1.0, 10.0, Element::Unknown).with_buffs(Buffs {
            tank_tier: Some(6),
            has_shield: true,
            damage_reflection_percent: 18.0,
            ..Buffs::default()
        });

        let res = engine.resolve(&mut a, &mut b, &mut FixedRng::constant(0.5));
        assert_eq!(res.damage, 50.0);
        assert_eq!(a.hp(), 91.0);
        assert!(res.effects.contains(&TurnEffect::Reflected { amount: 9.0 }));
    }

    #[test]
    fn reflection_uses_the_resolved_buff() {
        let config = config(BattleType::Duel);
        let engine = CombatEngine::new(&config, &StandardResolver);
        let mut a = fighter("A", 100.0, 60.0, 0.0, Element::Unknown);
        let mut b = fighter("B", 200.0, 1.0, 10.0, Element::Unknown).with_buffs(Buffs {
            tank_tier: Some(1),
            has_shield: true,
            damage_reflection_percent: 50.0,
            ..Buffs::default()
        });

        let res = engine.resolve(&mut a, &mut b, &mut FixedRng::constant(0.5));
        assert_eq!(res.damage, 50.0);
        assert_eq!(a.hp(), 75.0);
        assert!(res.effects.contains(&TurnEffect::Reflected { amount: 25.0 }));
    }

    #[test]
    fn reflection_needs_a_tank_tier() {
        let config = config(BattleType::Duel);
        let engine = CombatEngine::new(&config, &StandardResolver);
        let mut a = fighter("A", 100.0, 60.0, 0.0, Element::Unknown);
        let mut b = fighter("B", 200.0, 1.0, 10.0, Element::Unknown).with_buffs(Buffs {
            has_shield: true,
            damage_reflection_percent: 50.0,
            ..Buffs::default()
        });
        engine.resolve(&mut a, &mut b, &mut FixedRng::constant(0.5));
        assert_eq!(a.hp(), 100.0);
    }

    #[test]
    fn tank_without_shield_does_not_reflect() {
        let config = config(BattleType::Duel);
        let engine = CombatEngine::new(&config, &StandardResolver);
        let mut a = fighter("A", 100.0, 60.0, 0.0, Element::Unknown);
        let mut b = fighter("B", 200.0, 1.0, 10.0, Element::Unknown).with_buffs(Buffs {
            tank_tier: Some(6),
            has_shield: false,
            ..Buffs::default()
        });
        engine.resolve(&mut a, &mut b, &mut FixedRng::constant(0.5));
        assert_eq!(a.hp(), 100.0);
    }

    #[test]
    fn simple_strategy_ignores_elements() {
        let config = config(BattleType::Raid);
        let engine = CombatEngine::new(&config, &StandardResolver);
        let mut a = fighter("A", 100.0, 30.0, 0.0, Element::Fire);
        let mut b = fighter("B", 100.0, 1.0, 5.0, Element::Nature);
        let res = engine.resolve(&mut a, &mut b, &mut FixedRng::constant(1.0));
        assert_eq!(res.damage, 32.0);
        assert!(res.effects.is_empty());
    }
}
