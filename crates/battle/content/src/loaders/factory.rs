//! Content factory for loading every data file from one directory.

use std::path::{Path, PathBuf};

use crate::loaders::{
    BattleTables, ConfigLoader, LoadResult, Roster, RosterLoader, SettingsSeed, TablesLoader,
};

/// Content factory that loads battle content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── settings.toml   (optional)
/// ├── tables.ron
/// └── roster.ron      (optional, simulation only)
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load encounter tables from `tables.ron`.
    pub fn load_tables(&self) -> LoadResult<BattleTables> {
        TablesLoader::load(&self.data_dir.join("tables.ron"))
    }

    /// Load the settings seed from `settings.toml`, or an empty seed when the
    /// file does not exist.
    pub fn load_settings(&self) -> LoadResult<SettingsSeed> {
        let path = self.data_dir.join("settings.toml");
        if !path.exists() {
            return Ok(SettingsSeed::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load the participant roster from `roster.ron`.
    pub fn load_roster(&self) -> LoadResult<Roster> {
        RosterLoader::load(&self.data_dir.join("roster.ron"))
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
