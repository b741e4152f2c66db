//! Battle feature flags and the immutable config snapshot baked into a battle.
//!
//! Settings are stored as JSON values keyed by [`SettingKey`]. The runtime's
//! settings registry resolves a value per key (per-type override → global →
//! compiled default) and [`BattleConfig::resolve`] parses the result into
//! typed fields once, at battle creation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::battle_type::BattleType;
use crate::error::ConfigError;

/// Known setting keys.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SettingKey {
    AllowPets,
    ElementEffects,
    ClassBuffs,
    LuckEffects,
    Lifesteal,
    DeathCheat,
    Reflection,
    PetsContinueBattle,
    DamageStrategy,
    MaxTurns,
    TurnDelayMs,
    BattleLogSize,
}

/// The two damage formulas in use; which one applies is a per-type setting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DamageStrategy {
    /// Flat stats plus a random 1–7 swing before armor.
    Simple,
    /// Armor-reduced base scaled by element, class and luck modifiers.
    Elemental,
}

impl SettingKey {
    /// Compiled-in default for `key` in a `battle_type` battle.
    pub fn compiled_default(self, battle_type: BattleType) -> Value {
        match self {
            Self::AllowPets
            | Self::ElementEffects
            | Self::ClassBuffs
            | Self::Lifesteal
            | Self::DeathCheat
            | Self::Reflection => Value::Bool(true),
            Self::LuckEffects | Self::PetsContinueBattle => Value::Bool(false),
            Self::DamageStrategy => {
                let strategy = match battle_type {
                    BattleType::Raid | BattleType::Brawl => DamageStrategy::Simple,
                    _ => DamageStrategy::Elemental,
                };
                Value::String(strategy.as_ref().to_string())
            }
            Self::MaxTurns => Value::from(match battle_type {
                BattleType::Duel => 50,
                BattleType::Pve | BattleType::Tower => 60,
                BattleType::Team | BattleType::Brawl => 80,
                BattleType::Raid | BattleType::CoopTower => 100,
                BattleType::Dragon => 150,
            }),
            Self::TurnDelayMs => Value::from(match battle_type {
                BattleType::Raid | BattleType::Brawl => 1_000,
                BattleType::Pve | BattleType::Tower | BattleType::CoopTower => 2_000,
                BattleType::Team | BattleType::Dragon => 3_000,
                BattleType::Duel => 4_000,
            }),
            Self::BattleLogSize => Value::from(5),
        }
    }
}

/// Call-site overrides. Highest priority, never persisted.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsOverrides {
    values: BTreeMap<SettingKey, Value>,
}

impl SettingsOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, key: SettingKey, value: impl Into<Value>) -> Self {
        self.values.insert(key, value.into());
        self
    }

    pub fn get(&self, key: SettingKey) -> Option<&Value> {
        self.values.get(&key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SettingKey, &Value)> {
        self.values.iter()
    }
}

/// Immutable, typed configuration of one battle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BattleConfig {
    pub battle_type: BattleType,
    pub allow_pets: bool,
    pub element_effects: bool,
    pub class_buffs: bool,
    pub luck_effects: bool,
    pub lifesteal: bool,
    pub death_cheat: bool,
    pub reflection: bool,
    pub pets_continue_battle: bool,
    pub damage_strategy: DamageStrategy,
    pub max_turns: u32,
    pub turn_delay_ms: u64,
    pub battle_log_size: usize,
}

impl BattleConfig {
    /// Build a config from compiled defaults only.
    pub fn defaults(battle_type: BattleType) -> Self {
        match Self::resolve(battle_type, |_| None) {
            Ok(config) => config,
            Err(_) => unreachable!("compiled defaults are well-formed"),
        }
    }

    /// Parse a config, asking `lookup` for each key and falling back to the
    /// compiled default when it returns `None`.
    pub fn resolve(
        battle_type: BattleType,
        lookup: impl Fn(SettingKey) -> Option<Value>,
    ) -> Result<Self, ConfigError> {
        let value = |key: SettingKey| lookup(key).unwrap_or_else(|| key.compiled_default(battle_type));

        Ok(Self {
            battle_type,
            allow_pets: parse_bool(SettingKey::AllowPets, value(SettingKey::AllowPets))?,
            element_effects: parse_bool(SettingKey::ElementEffects, value(SettingKey::ElementEffects))?,
            class_buffs: parse_bool(SettingKey::ClassBuffs, value(SettingKey::ClassBuffs))?,
            luck_effects: parse_bool(SettingKey::LuckEffects, value(SettingKey::LuckEffects))?,
            lifesteal: parse_bool(SettingKey::Lifesteal, value(SettingKey::Lifesteal))?,
            death_cheat: parse_bool(SettingKey::DeathCheat, value(SettingKey::DeathCheat))?,
            reflection: parse_bool(SettingKey::Reflection, value(SettingKey::Reflection))?,
            pets_continue_battle: parse_bool(
                SettingKey::PetsContinueBattle,
                value(SettingKey::PetsContinueBattle),
            )?,
            damage_strategy: parse_strategy(value(SettingKey::DamageStrategy))?,
            max_turns: parse_u64(SettingKey::MaxTurns, value(SettingKey::MaxTurns))?
                .try_into()
                .unwrap_or(u32::MAX),
            turn_delay_ms: parse_u64(SettingKey::TurnDelayMs, value(SettingKey::TurnDelayMs))?,
            battle_log_size: parse_u64(SettingKey::BattleLogSize, value(SettingKey::BattleLogSize))?
                .try_into()
                .unwrap_or(usize::MAX),
        })
    }
}

/// Check that `value` is acceptable for `key`, without building a config.
pub fn validate_setting(key: SettingKey, value: &Value) -> Result<(), ConfigError> {
    match key {
        SettingKey::DamageStrategy => parse_strategy(value.clone()).map(|_| ()),
        SettingKey::MaxTurns | SettingKey::TurnDelayMs | SettingKey::BattleLogSize => {
            parse_u64(key, value.clone()).map(|_| ())
        }
        _ => parse_bool(key, value.clone()).map(|_| ()),
    }
}

fn parse_bool(key: SettingKey, value: Value) -> Result<bool, ConfigError> {
    value.as_bool().ok_or(ConfigError::InvalidSetting {
        key,
        value,
        expected: "a boolean",
    })
}

fn parse_u64(key: SettingKey, value: Value) -> Result<u64, ConfigError> {
    value.as_u64().ok_or(ConfigError::InvalidSetting {
        key,
        value,
        expected: "a non-negative integer",
    })
}

fn parse_strategy(value: Value) -> Result<DamageStrategy, ConfigError> {
    value
        .as_str()
        .and_then(|s| s.parse().ok())
        .ok_or(ConfigError::InvalidSetting {
            key: SettingKey::DamageStrategy,
            value,
            expected: "\"simple\" or \"elemental\"",
        })
}
