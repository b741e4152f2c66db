//! Elemental palette and the attacker/defender counter cycle.
//!
//! ```text
//! Fire -> Nature -> Electric -> Water -> Dark -> Light -> Fire
//! ```
//!
//! Each element counters exactly the next one in the cycle and is countered by
//! exactly the previous one. [`Element::Unknown`] sits outside the cycle.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::rng::BattleRng;

/// Lower bound of the bonus rolled when the attacker counters the defender.
pub const COUNTER_BONUS_MIN: f64 = 0.10;
/// Upper bound of the bonus rolled when the attacker counters the defender.
pub const COUNTER_BONUS_MAX: f64 = 0.30;

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum Element {
    Fire,
    Nature,
    Electric,
    Water,
    Dark,
    Light,
    #[default]
    Unknown,
}

/// How an attacking element relates to a defending one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Affinity {
    /// Attacker counters the defender.
    Counter,
    /// Defender counters the attacker.
    Countered,
    Neutral,
}

impl Element {
    /// The six elements that take part in the counter cycle, in cycle order.
    pub const CYCLE: [Element; 6] = [
        Element::Fire,
        Element::Nature,
        Element::Electric,
        Element::Water,
        Element::Dark,
        Element::Light,
    ];

    /// The element this one counters, if any.
    pub const fn counters(self) -> Option<Element> {
        match self {
            Element::Fire => Some(Element::Nature),
            Element::Nature => Some(Element::Electric),
            Element::Electric => Some(Element::Water),
            Element::Water => Some(Element::Dark),
            Element::Dark => Some(Element::Light),
            Element::Light => Some(Element::Fire),
            Element::Unknown => None,
        }
    }

    pub fn affinity_against(self, defender: Element) -> Affinity {
        if self.counters() == Some(defender) {
            Affinity::Counter
        } else if defender.counters() == Some(self) {
            Affinity::Countered
        } else {
            Affinity::Neutral
        }
    }
}

/// Roll the elemental damage modifier for `attacker` hitting `defender`.
///
/// Returns a value in `[-0.30, 0.30]`:
/// - counter: uniform bonus in `[0.10, 0.30]`
/// - countered: uniform penalty in `[-0.30, -0.10]`
/// - neutral (including anything involving `Unknown`): `0.0`, no draw
pub fn elemental_modifier(attacker: Element, defender: Element, rng: &mut dyn BattleRng) -> f64 {
    match attacker.affinity_against(defender) {
        Affinity::Counter => rng.uniform(COUNTER_BONUS_MIN, COUNTER_BONUS_MAX),
        Affinity::Countered => -rng.uniform(COUNTER_BONUS_MIN, COUNTER_BONUS_MAX),
        Affinity::Neutral => 0.0,
    }
}
