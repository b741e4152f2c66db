//! Settings seed loader.
//!
//! `settings.toml` lists global and per-type defaults that an operator wants
//! in place before any override is written at runtime:
//!
//! ```toml
//! [global]
//! luck_effects = true
//!
//! [battle.raid]
//! max_turns = 120
//! damage_strategy = "simple"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use battle_core::{BattleType, SettingKey, validate_setting};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::loaders::{LoadResult, read_file};

/// Global and per-type setting defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsSeed {
    #[serde(default)]
    pub global: BTreeMap<SettingKey, Value>,
    #[serde(default)]
    pub battle: BTreeMap<BattleType, BTreeMap<SettingKey, Value>>,
}

impl SettingsSeed {
    /// Every seeded value as `(scope, key, value)`; `None` is the global scope.
    pub fn entries(&self) -> impl Iterator<Item = (Option<BattleType>, SettingKey, &Value)> {
        let global = self.global.iter().map(|(key, value)| (None, *key, value));
        let per_type = self.battle.iter().flat_map(|(battle_type, values)| {
            values
                .iter()
                .map(move |(key, value)| (Some(*battle_type), *key, value))
        });
        global.chain(per_type)
    }

    pub fn is_empty(&self) -> bool {
        self.global.is_empty() && self.battle.values().all(BTreeMap::is_empty)
    }

    /// Check every value against its key's expected type.
    pub fn validate(&self) -> LoadResult<()> {
        for (scope, key, value) in self.entries() {
            validate_setting(key, value).map_err(|e| match scope {
                Some(battle_type) => anyhow::anyhow!("[battle.{}] {}", battle_type, e),
                None => anyhow::anyhow!("[global] {}", e),
            })?;
        }
        Ok(())
    }
}

/// Loader for settings seeds from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate a settings seed from a TOML file.
    pub fn load(path: &Path) -> LoadResult<SettingsSeed> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<SettingsSeed> {
        let seed: SettingsSeed = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse settings TOML: {}", e))?;
        seed.validate()?;
        Ok(seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_global_and_per_type_sections() {
        let seed = ConfigLoader::parse(
            r#"
            [global]
            luck_effects = true

            [battle.raid]
            max_turns = 120
            damage_strategy = "elemental"
            "#,
        )
        .unwrap();

        assert_eq!(seed.global.get(&SettingKey::LuckEffects), Some(&json!(true)));
        let entries: Vec<_> = seed.entries().collect();
        assert_eq!(entries.len(), 3);
        assert!(entries.contains(&(Some(BattleType::Raid), SettingKey::MaxTurns, &json!(120))));
    }

    #[test]
    fn rejects_values_of_the_wrong_type() {
        let err = ConfigLoader::parse(
            r#"
            [battle.duel]
            allow_pets = "sometimes"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("[battle.duel]"));
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(ConfigLoader::parse("[global]\nsuper_mode = true\n").is_err());
    }

    #[test]
    fn empty_file_is_an_empty_seed() {
        assert!(ConfigLoader::parse("").unwrap().is_empty());
    }
}
