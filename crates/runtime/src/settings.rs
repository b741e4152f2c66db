//! Layered settings registry.
//!
//! Resolution order for `(battle_type, key)`:
//!
//! 1. call-site [`SettingsOverrides`] (only in [`SettingsRegistry::apply_to`], never persisted)
//! 2. per-type override (`SettingsScope::Battle`)
//! 3. global default (`SettingsScope::Global`)
//! 4. compiled default ([`SettingKey::compiled_default`])
//!
//! The registry is a cache-aside layer over a [`SettingsRepository`]. The
//! cache is an `Arc` snapshot replaced as a whole, so readers never observe a
//! half-applied write. Writes go to the store first; the cache changes only
//! after the store accepted the value.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use battle_content::SettingsSeed;
use battle_core::{BattleConfig, BattleType, ConfigError, SettingKey, SettingsOverrides, validate_setting};
use serde_json::Value;

use crate::api::Result;
use crate::repository::{RepositoryError, SettingsMap, SettingsRepository, SettingsScope};

pub struct SettingsRegistry {
    store: Arc<dyn SettingsRepository>,
    cache: RwLock<Arc<SettingsMap>>,
    /// Serializes writers so store order and cache order agree.
    write_lock: Mutex<()>,
}

impl SettingsRegistry {
    /// Create a registry and warm the cache from `store`.
    pub fn new(store: Arc<dyn SettingsRepository>) -> Result<Self> {
        let snapshot = store.load_all()?;
        Ok(Self {
            store,
            cache: RwLock::new(Arc::new(snapshot)),
            write_lock: Mutex::new(()),
        })
    }

    /// Current cache snapshot.
    pub fn snapshot(&self) -> Arc<SettingsMap> {
        // The lock only ever guards a complete snapshot, so a poisoned lock is
        // still safe to read.
        Arc::clone(&self.cache.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Effective value of `key` for `battle_type`.
    pub fn get(&self, battle_type: BattleType, key: SettingKey) -> Value {
        let snapshot = self.snapshot();
        layered(&snapshot, battle_type, key).unwrap_or_else(|| key.compiled_default(battle_type))
    }

    /// Value stored at exactly `scope`, without fallback.
    pub fn get_scoped(&self, scope: SettingsScope, key: SettingKey) -> Option<Value> {
        self.snapshot()
            .get(&scope)
            .and_then(|values| values.get(&key))
            .cloned()
    }

    /// Persist `value` at `scope`, then publish it to readers.
    ///
    /// Invalid values are rejected before touching the store. If the store
    /// write fails the cache is left unchanged.
    pub fn set(&self, scope: SettingsScope, key: SettingKey, value: Value) -> Result<()> {
        validate_setting(key, &value)?;

        let _writer = self.write_lock.lock().map_err(|_| RepositoryError::LockPoisoned)?;
        if let Err(err) = self.store.put(scope, key, &value) {
            tracing::error!(
                target: "runtime::settings",
                %scope,
                %key,
                error = %err,
                "failed to persist setting"
            );
            return Err(err.into());
        }

        let mut next = (*self.snapshot()).clone();
        next.entry(scope).or_default().insert(key, value.clone());
        self.replace(next);

        tracing::info!(target: "runtime::settings", %scope, %key, %value, "setting updated");
        Ok(())
    }

    /// Remove the value stored at `scope`, reverting to the fallback chain.
    ///
    /// Returns true if a value was removed.
    pub fn reset(&self, scope: SettingsScope, key: SettingKey) -> Result<bool> {
        let _writer = self.write_lock.lock().map_err(|_| RepositoryError::LockPoisoned)?;
        let removed = self.store.delete(scope, key)?;

        let mut next = (*self.snapshot()).clone();
        if let Some(values) = next.get_mut(&scope) {
            values.remove(&key);
            if values.is_empty() {
                next.remove(&scope);
            }
        }
        self.replace(next);

        tracing::info!(target: "runtime::settings", %scope, %key, removed, "setting reset");
        Ok(removed)
    }

    /// Reload the whole cache from the store, picking up writes made by other
    /// processes.
    pub fn force_refresh(&self) -> Result<()> {
        let _writer = self.write_lock.lock().map_err(|_| RepositoryError::LockPoisoned)?;
        let snapshot = self.store.load_all()?;
        let scopes = snapshot.len();
        self.replace(snapshot);
        tracing::debug!(target: "runtime::settings", scopes, "settings cache refreshed");
        Ok(())
    }

    /// Write every seeded value that is not already stored.
    ///
    /// Returns the number of values written.
    pub fn seed(&self, seed: &SettingsSeed) -> Result<usize> {
        let mut written = 0;
        for (battle_type, key, value) in seed.entries() {
            let scope = SettingsScope::from(battle_type);
            if self.get_scoped(scope, key).is_none() {
                self.set(scope, key, value.clone())?;
                written += 1;
            }
        }
        if written > 0 {
            tracing::info!(target: "runtime::settings", written, "settings seeded");
        }
        Ok(written)
    }

    /// Resolve the immutable config a new battle is built with.
    ///
    /// Call-site `overrides` win over everything stored.
    pub fn apply_to(
        &self,
        battle_type: BattleType,
        overrides: &SettingsOverrides,
    ) -> std::result::Result<BattleConfig, ConfigError> {
        let snapshot = self.snapshot();
        BattleConfig::resolve(battle_type, |key| {
            overrides
                .get(key)
                .cloned()
                .or_else(|| layered(&snapshot, battle_type, key))
        })
    }

    fn replace(&self, next: SettingsMap) {
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        *cache = Arc::new(next);
    }
}

/// Stored value for `battle_type`, per-type first, then global.
fn layered(snapshot: &SettingsMap, battle_type: BattleType, key: SettingKey) -> Option<Value> {
    [SettingsScope::Battle(battle_type), SettingsScope::Global]
        .iter()
        .find_map(|scope| snapshot.get(scope).and_then(|values| values.get(&key)))
        .cloned()
}
