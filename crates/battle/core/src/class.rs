//! Class lines and their deterministic buff tables.
//!
//! A participant carries a list of [`ClassSpec`]s (line + tier). Only four lines
//! influence combat; everything else is [`ClassLine::Other`] and is ignored.
//! Tiers run from 1 to [`MAX_TIER`]; out-of-range tiers clamp to the table.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

pub const MAX_TIER: u8 = 6;

const MAGE_MULTIPLIERS: [f64; MAX_TIER as usize] = [1.10, 1.20, 1.35, 1.50, 1.75, 2.00];

const TANK_SHIELD_HEALTH: [f64; MAX_TIER as usize] = [1.05, 1.10, 1.15, 1.20, 1.25, 1.30];
const TANK_SHIELD_REFLECTION: [f64; MAX_TIER as usize] = [3.0, 6.0, 9.0, 12.0, 15.0, 18.0];
const TANK_BARE_HEALTH: [f64; MAX_TIER as usize] = [1.02, 1.04, 1.06, 1.08, 1.10, 1.12];

const REAPER_LIFESTEAL: [f64; MAX_TIER as usize] = [5.0, 7.5, 10.0, 12.5, 15.0, 20.0];
const RITUALIST_DEATH_CHEAT: [f64; MAX_TIER as usize] = [5.0, 10.0, 15.0, 20.0, 25.0, 30.0];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum ClassLine {
    /// Boosts elemental damage.
    Mage,
    /// Extra health; reflects damage while holding a shield.
    Tank,
    /// Heals from damage dealt.
    Reaper,
    /// Chance to survive a lethal blow once per battle.
    Ritualist,
    /// Any class without a combat effect.
    Other,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassSpec {
    pub line: ClassLine,
    pub tier: u8,
}

impl ClassSpec {
    pub const fn new(line: ClassLine, tier: u8) -> Self {
        Self { line, tier }
    }
}

/// Health and reflection granted by a tank tier.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TankProfile {
    pub health_multiplier: f64,
    /// Percentage of damage taken that is reflected to the attacker.
    pub reflection_percent: f64,
}

impl TankProfile {
    pub const NONE: TankProfile = TankProfile {
        health_multiplier: 1.0,
        reflection_percent: 0.0,
    };
}

fn tier_index(tier: u8) -> Option<usize> {
    match tier {
        0 => None,
        t => Some(usize::from(t.min(MAX_TIER)) - 1),
    }
}

/// Damage multiplier for a mage tier. Tier 0 means no mage class.
pub fn mage_multiplier(tier: u8) -> f64 {
    tier_index(tier).map_or(1.0, |i| MAGE_MULTIPLIERS[i])
}

/// Tank bonuses; reflection is only active while holding a shield.
pub fn tank_profile(tier: u8, has_shield: bool) -> TankProfile {
    let Some(i) = tier_index(tier) else {
        return TankProfile::NONE;
    };
    if has_shield {
        TankProfile {
            health_multiplier: TANK_SHIELD_HEALTH[i],
            reflection_percent: TANK_SHIELD_REFLECTION[i],
        }
    } else {
        TankProfile {
            health_multiplier: TANK_BARE_HEALTH[i],
            reflection_percent: 0.0,
        }
    }
}

pub fn lifesteal_percent(tier: u8) -> f64 {
    tier_index(tier).map_or(0.0, |i| REAPER_LIFESTEAL[i])
}

pub fn death_cheat_chance(tier: u8) -> f64 {
    tier_index(tier).map_or(0.0, |i| RITUALIST_DEATH_CHEAT[i])
}
