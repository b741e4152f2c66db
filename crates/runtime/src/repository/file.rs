//! File-based SettingsRepository implementation.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use battle_core::SettingKey;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::repository::{RepositoryError, Result, SettingsMap, SettingsRepository, SettingsScope};

const FORMAT_VERSION: u32 = 1;

/// On-disk layout of the settings file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct SettingsDocument {
    version: u32,
    #[serde(default)]
    scopes: SettingsMap,
}

/// File-based implementation of SettingsRepository.
///
/// All values live in one pretty-printed JSON document:
///
/// ```json
/// { "version": 1, "scopes": { "global": { "luck_effects": true }, "raid": { "max_turns": 120 } } }
/// ```
///
/// Every write rewrites the document through a temp file and an atomic rename,
/// so readers in other processes see either the old or the new document.
/// [`load_all`](SettingsRepository::load_all) always reads from disk.
pub struct FileSettingsRepository {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileSettingsRepository {
    /// Create a repository backed by `path`, creating parent directories.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(RepositoryError::Io)?;
        }
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<SettingsDocument> {
        if !self.path.exists() {
            return Ok(SettingsDocument {
                version: FORMAT_VERSION,
                scopes: SettingsMap::new(),
            });
        }

        let bytes = fs::read(&self.path).map_err(RepositoryError::Io)?;
        let document: SettingsDocument = serde_json::from_slice(&bytes)
            .map_err(|e| RepositoryError::CorruptedData(format!("{}: {}", self.path.display(), e)))?;

        if document.version != FORMAT_VERSION {
            return Err(RepositoryError::UnsupportedVersion {
                found: document.version,
                expected: FORMAT_VERSION,
            });
        }
        Ok(document)
    }

    fn write_document(&self, document: &SettingsDocument) -> Result<()> {
        let temp_path = self.path.with_extension("json.tmp");

        let bytes = serde_json::to_vec_pretty(document).map_err(|e| RepositoryError::Json(e.to_string()))?;

        // Write to temp file
        fs::write(&temp_path, bytes).map_err(RepositoryError::Io)?;

        // Atomic rename
        fs::rename(&temp_path, &self.path).map_err(RepositoryError::Io)?;

        tracing::debug!(target: "runtime::repository", "Saved settings to {}", self.path.display());
        Ok(())
    }

    /// Read-modify-write under the process-local write lock.
    fn update<T>(&self, apply: impl FnOnce(&mut SettingsMap) -> T) -> Result<T> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let mut document = self.read_document()?;
        let result = apply(&mut document.scopes);
        document.version = FORMAT_VERSION;
        self.write_document(&document)?;
        Ok(result)
    }
}

impl SettingsRepository for FileSettingsRepository {
    fn load_all(&self) -> Result<SettingsMap> {
        Ok(self.read_document()?.scopes)
    }

    fn put(&self, scope: SettingsScope, key: SettingKey, value: &Value) -> Result<()> {
        self.update(|scopes| {
            scopes.entry(scope).or_default().insert(key, value.clone());
        })
    }

    fn delete(&self, scope: SettingsScope, key: SettingKey) -> Result<bool> {
        self.update(|scopes| {
            let removed = scopes
                .get_mut(&scope)
                .is_some_and(|values| values.remove(&key).is_some());
            if scopes.get(&scope).is_some_and(|values| values.is_empty()) {
                scopes.remove(&scope);
            }
            removed
        })
    }
}
