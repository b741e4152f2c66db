//! Construction data supplied by external collaborators.
//!
//! The core never computes stats itself: the stat/inventory provider hands over
//! a [`ParticipantProfile`] (and optionally a [`PetProfile`]), the monster
//! provider a [`MonsterTemplate`]. The factory turns these into combatants.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::class::ClassSpec;
use crate::element::Element;

/// Stable identity of a participant (player account).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(pub String);

impl ParticipantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Equipped element data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementProfile {
    pub attack: Element,
    pub defense: Element,
    /// Two attack elements used alternately (dual-wielding two elemental weapons).
    #[serde(default)]
    pub dual: Option<(Element, Element)>,
}

impl ElementProfile {
    pub const fn single(element: Element) -> Self {
        Self {
            attack: element,
            defense: element,
            dual: None,
        }
    }
}

/// Raw stats of a player as reported by the stat/inventory provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParticipantProfile {
    pub id: ParticipantId,
    pub name: String,
    pub hp_pool: f64,
    pub base_damage: f64,
    pub base_armor: f64,
    #[serde(default)]
    pub elements: ElementProfile,
    #[serde(default)]
    pub classes: Vec<ClassSpec>,
    #[serde(default = "default_luck")]
    pub luck: f64,
    #[serde(default)]
    pub has_shield: bool,
}

fn default_luck() -> f64 {
    50.0
}

/// A pet fighting next to its owner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PetProfile {
    pub name: String,
    pub hp: f64,
    pub damage: f64,
    pub armor: f64,
    #[serde(default)]
    pub element: Element,
}

/// Multipliers applied to a monster template (tower growth, dragon stages).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatScaling {
    pub hp_multiplier: f64,
    pub damage_multiplier: f64,
}

impl StatScaling {
    pub const IDENTITY: StatScaling = StatScaling {
        hp_multiplier: 1.0,
        damage_multiplier: 1.0,
    };

    pub const fn new(hp_multiplier: f64, damage_multiplier: f64) -> Self {
        Self {
            hp_multiplier,
            damage_multiplier,
        }
    }

    /// Combine two scalings multiplicatively.
    pub fn then(self, other: StatScaling) -> Self {
        Self::new(
            self.hp_multiplier * other.hp_multiplier,
            self.damage_multiplier * other.damage_multiplier,
        )
    }
}

impl Default for StatScaling {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// A monster or boss as listed in the content tables.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonsterTemplate {
    pub name: String,
    pub hp: f64,
    pub attack: f64,
    pub defense: f64,
    #[serde(default)]
    pub element: Element,
}

impl MonsterTemplate {
    /// Scale hp and attack, used for tower floors and leveled bosses.
    pub fn scaled(&self, scaling: StatScaling) -> Self {
        Self {
            name: self.name.clone(),
            hp: self.hp * scaling.hp_multiplier,
            attack: self.attack * scaling.damage_multiplier,
            defense: self.defense,
            element: self.element,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaling_composes_and_keeps_defense() {
        let slime = MonsterTemplate {
            name: "Slime".into(),
            hp: 40.0,
            attack: 6.0,
            defense: 2.0,
            element: Element::Water,
        };
        let scaling = StatScaling::new(2.0, 1.5).then(StatScaling::new(1.5, 2.0));
        let big = slime.scaled(scaling);
        assert_eq!(big.hp, 120.0);
        assert_eq!(big.attack, 18.0);
        assert_eq!(big.defense, 2.0);
        assert_eq!(slime.scaled(StatScaling::IDENTITY), slime);
    }

    #[test]
    fn profile_fields_default_when_omitted() {
        let profile: ParticipantProfile = serde_json::from_str(
            r#"{"id":"p1","name":"Ayla","hp_pool":120.0,"base_damage":14.0,"base_armor":3.0}"#,
        )
        .unwrap();
        assert_eq!(profile.id, ParticipantId::from("p1"));
        assert!(profile.classes.is_empty());
        assert_eq!(profile.elements.attack, Element::Unknown);
        assert!(!profile.has_shield);
        assert_eq!(profile.luck, 50.0);
    }
}
