//! Repository contract for persisted battle settings.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use battle_core::{BattleType, SettingKey};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Result;

/// Where a setting applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum SettingsScope {
    /// Default for every battle type.
    Global,
    /// Override for one battle type.
    Battle(BattleType),
}

impl SettingsScope {
    pub const GLOBAL_TAG: &'static str = "global";
}

impl fmt::Display for SettingsScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => f.write_str(Self::GLOBAL_TAG),
            Self::Battle(battle_type) => write!(f, "{battle_type}"),
        }
    }
}

impl FromStr for SettingsScope {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s == Self::GLOBAL_TAG {
            return Ok(Self::Global);
        }
        s.parse::<BattleType>()
            .map(Self::Battle)
            .map_err(|_| format!("unknown settings scope '{s}'"))
    }
}

impl From<SettingsScope> for String {
    fn from(scope: SettingsScope) -> Self {
        scope.to_string()
    }
}

impl TryFrom<String> for SettingsScope {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Option<BattleType>> for SettingsScope {
    fn from(battle_type: Option<BattleType>) -> Self {
        battle_type.map_or(Self::Global, Self::Battle)
    }
}

/// Every stored value, keyed by scope then setting.
pub type SettingsMap = BTreeMap<SettingsScope, BTreeMap<SettingKey, Value>>;

/// Durable store for settings overrides.
///
/// This is for DYNAMIC data that operators change while the server runs.
/// Compiled defaults never live here; a missing entry means "fall through".
pub trait SettingsRepository: Send + Sync {
    /// Load every stored value.
    fn load_all(&self) -> Result<SettingsMap>;

    /// Load a single value.
    fn get(&self, scope: SettingsScope, key: SettingKey) -> Result<Option<Value>> {
        Ok(self
            .load_all()?
            .get(&scope)
            .and_then(|values| values.get(&key))
            .cloned())
    }

    /// Durably store a value, replacing any previous one.
    fn put(&self, scope: SettingsScope, key: SettingKey, value: &Value) -> Result<()>;

    /// Remove a value. Returns true if something was removed.
    fn delete(&self, scope: SettingsScope, key: SettingKey) -> Result<bool>;
}
