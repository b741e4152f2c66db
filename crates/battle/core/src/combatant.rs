//! A single fighting unit: player, pet, monster or boss.
//!
//! Combatants are created by the factory, mutated only by the resolution
//! engine and dropped together with their battle.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::element::Element;
use crate::profile::ParticipantId;

/// Who a combatant represents.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombatantId {
    Player(ParticipantId),
    /// A pet, keyed by its owner.
    Pet(ParticipantId),
    /// A monster or boss, keyed by display name.
    Monster(String),
}

impl CombatantId {
    /// Owning participant, for players and pets.
    pub fn participant(&self) -> Option<&ParticipantId> {
        match self {
            Self::Player(id) | Self::Pet(id) => Some(id),
            Self::Monster(_) => None,
        }
    }
}

impl fmt::Display for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player(id) => write!(f, "{id}"),
            Self::Pet(owner) => write!(f, "pet of {owner}"),
            Self::Monster(name) => f.write_str(name),
        }
    }
}

/// Combat buffs resolved from class tables at construction time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Buffs {
    /// Percentage of damage dealt healed back.
    pub lifesteal_percent: f64,
    /// Percentage chance to survive a lethal hit with 1 hp (once per battle).
    pub death_cheat_chance: f64,
    pub mage_tier: Option<u8>,
    pub tank_tier: Option<u8>,
    /// Percentage of damage taken reflected to the attacker.
    pub damage_reflection_percent: f64,
    pub has_shield: bool,
}

/// One fighting unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Combatant {
    pub id: CombatantId,
    pub name: String,
    hp: f64,
    max_hp: f64,
    pub damage: f64,
    pub armor: f64,
    pub attack_element: Element,
    pub defense_element: Element,
    pub dual_attack_elements: Option<(Element, Element)>,
    /// Next slot of `dual_attack_elements` to use (0 or 1).
    dual_cursor: u8,
    pub luck: f64,
    pub is_pet: bool,
    pub is_dragon: bool,
    pub buffs: Buffs,
    has_cheated_death: bool,
}

impl Combatant {
    /// Create a combatant at full health. Negative stats are clamped to zero.
    pub fn new(id: CombatantId, name: impl Into<String>, max_hp: f64, damage: f64, armor: f64) -> Self {
        let max_hp = sanitize(max_hp);
        Self {
            id,
            name: name.into(),
            hp: max_hp,
            max_hp,
            damage: sanitize(damage),
            armor: sanitize(armor),
            attack_element: Element::Unknown,
            defense_element: Element::Unknown,
            dual_attack_elements: None,
            dual_cursor: 0,
            luck: 50.0,
            is_pet: false,
            is_dragon: false,
            buffs: Buffs::default(),
            has_cheated_death: false,
        }
    }

    // ===== builder helpers =====

    #[must_use]
    pub fn with_elements(mut self, attack: Element, defense: Element) -> Self {
        self.attack_element = attack;
        self.defense_element = defense;
        self
    }

    #[must_use]
    pub fn with_dual_elements(mut self, pair: Option<(Element, Element)>) -> Self {
        self.dual_attack_elements = pair;
        self.dual_cursor = 0;
        self
    }

    #[must_use]
    pub fn with_luck(mut self, luck: f64) -> Self {
        self.luck = if luck.is_nan() { 0.0 } else { luck.clamp(0.0, 100.0) };
        self
    }

    #[must_use]
    pub fn with_buffs(mut self, buffs: Buffs) -> Self {
        self.buffs = buffs;
        self
    }

    #[must_use]
    pub fn as_pet(mut self) -> Self {
        self.is_pet = true;
        self
    }

    #[must_use]
    pub fn as_dragon(mut self) -> Self {
        self.is_dragon = true;
        self
    }

    // ===== queries =====

    pub fn hp(&self) -> f64 {
        self.hp
    }

    pub fn max_hp(&self) -> f64 {
        self.max_hp
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0.0
    }

    pub fn has_cheated_death(&self) -> bool {
        self.has_cheated_death
    }

    /// Whether this combatant can still survive a lethal hit this battle.
    pub fn can_cheat_death(&self) -> bool {
        !self.has_cheated_death && self.buffs.death_cheat_chance > 0.0
    }

    // ===== mutation (engine only) =====

    /// Subtract `amount` hp, clamping into `[0, max_hp]`.
    ///
    /// Returns the hp actually removed. Negative amounts heal (and return a
    /// negative value); NaN is ignored.
    pub fn apply_damage(&mut self, amount: f64) -> f64 {
        if amount.is_nan() {
            return 0.0;
        }
        let before = self.hp;
        self.hp = (self.hp - amount).clamp(0.0, self.max_hp);
        before - self.hp
    }

    /// Restore up to `amount` hp, capped at `max_hp`. Returns hp restored.
    pub fn heal(&mut self, amount: f64) -> f64 {
        if amount.is_nan() || amount <= 0.0 || !self.is_alive() {
            return 0.0;
        }
        -self.apply_damage(-amount)
    }

    /// Survive a lethal blow with exactly 1 hp and consume the one-shot flag.
    ///
    /// Returns the hp removed by the blow.
    pub(crate) fn cheat_death(&mut self) -> f64 {
        let before = self.hp;
        self.hp = self.max_hp.min(1.0);
        self.has_cheated_death = true;
        before - self.hp
    }

    /// Element for the next attack, advancing the dual-element round robin.
    pub(crate) fn next_attack_element(&mut self) -> Element {
        match self.dual_attack_elements {
            Some((first, second)) => {
                let element = if self.dual_cursor == 0 { first } else { second };
                self.dual_cursor ^= 1;
                element
            }
            None => self.attack_element,
        }
    }
}

fn sanitize(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value.max(0.0) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn dummy(hp: f64) -> Combatant {
        Combatant::new(CombatantId::Monster("dummy".into()), "Dummy", hp, 10.0, 0.0)
    }

    #[test]
    fn apply_damage_reports_actual_damage() {
        let mut c = dummy(50.0);
        assert_eq!(c.apply_damage(20.0), 20.0);
        assert_eq!(c.apply_damage(100.0), 30.0);
        assert!(!c.is_alive());
        assert_eq!(c.apply_damage(5.0), 0.0);
    }

    #[test]
    fn heal_is_capped_and_skips_the_dead() {
        let mut c = dummy(50.0);
        c.apply_damage(10.0);
        assert_eq!(c.heal(25.0), 10.0);
        assert_eq!(c.hp(), 50.0);
        c.apply_damage(50.0);
        assert_eq!(c.heal(10.0), 0.0);
    }

    #[test]
    fn dual_elements_alternate() {
        let mut c = dummy(10.0).with_dual_elements(Some((Element::Fire, Element::Water)));
        assert_eq!(c.next_attack_element(), Element::Fire);
        assert_eq!(c.next_attack_element(), Element::Water);
        assert_eq!(c.next_attack_element(), Element::Fire);
    }

    #[test]
    fn negative_stats_are_clamped() {
        let c = Combatant::new(CombatantId::Monster("x".into()), "X", -5.0, -1.0, f64::NAN);
        assert_eq!(c.max_hp(), 0.0);
        assert_eq!(c.damage, 0.0);
        assert_eq!(c.armor, 0.0);
        assert!(!c.is_alive());
    }

    proptest! {
        #[test]
        fn hp_stays_within_bounds(max_hp in 1.0f64..10_000.0, hits in proptest::collection::vec(-1e6f64..1e6, 1..32)) {
            let mut c = dummy(max_hp);
            for hit in hits {
                c.apply_damage(hit);
                prop_assert!(c.hp() >= 0.0 && c.hp() <= c.max_hp());
            }
        }
    }
}
