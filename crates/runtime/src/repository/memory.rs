//! In-memory SettingsRepository implementation for tests and local runs.

use std::sync::RwLock;

use battle_core::SettingKey;
use serde_json::Value;

use crate::repository::{RepositoryError, Result, SettingsMap, SettingsRepository, SettingsScope};

/// In-memory implementation of SettingsRepository.
///
/// Nothing survives the process; use [`FileSettingsRepository`] for that.
///
/// [`FileSettingsRepository`]: crate::repository::FileSettingsRepository
#[derive(Default)]
pub struct InMemorySettingsRepo {
    values: RwLock<SettingsMap>,
}

impl InMemorySettingsRepo {
    /// Create a new empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with pre-populated values.
    pub fn with_values(values: SettingsMap) -> Self {
        Self {
            values: RwLock::new(values),
        }
    }
}

impl SettingsRepository for InMemorySettingsRepo {
    fn load_all(&self) -> Result<SettingsMap> {
        let values = self
            .values
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(values.clone())
    }

    fn get(&self, scope: SettingsScope, key: SettingKey) -> Result<Option<Value>> {
        let values = self
            .values
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(values.get(&scope).and_then(|v| v.get(&key)).cloned())
    }

    fn put(&self, scope: SettingsScope, key: SettingKey, value: &Value) -> Result<()> {
        let mut values = self
            .values
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        values.entry(scope).or_default().insert(key, value.clone());
        Ok(())
    }

    fn delete(&self, scope: SettingsScope, key: SettingKey) -> Result<bool> {
        let mut values = self
            .values
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let Some(scoped) = values.get_mut(&scope) else {
            return Ok(false);
        };
        let removed = scoped.remove(&key).is_some();
        if scoped.is_empty() {
            values.remove(&scope);
        }
        Ok(removed)
    }
}
