//! Simulation configuration loaded from the environment.
use std::env;
use std::path::PathBuf;

/// Configuration for an offline simulation run.
#[derive(Clone, Debug)]
pub struct SimConfig {
    /// Directory holding `tables.ron`, `settings.toml` and `roster.ron`.
    pub data_dir: PathBuf,
    /// JSON file backing the settings registry.
    pub settings_file: PathBuf,
    pub seed: Option<u64>,
    pub pacing: bool,
    pub event_buffer_size: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/../battle/content/data")),
            settings_file: data_dir().join("settings.json"),
            seed: None,
            pacing: false,
            event_buffer_size: 256,
        }
    }
}

impl SimConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `BATTLE_DATA_DIR` - Content directory (default: bundled content data)
    /// - `BATTLE_SETTINGS_FILE` - Settings store (default: platform data dir)
    /// - `BATTLE_SEED` - Seed for reproducible runs (default: entropy)
    /// - `BATTLE_PACING` - Sleep between turns (default: false)
    /// - `BATTLE_EVENT_BUFFER` - Event bus capacity per topic (default: 256)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = env::var("BATTLE_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Ok(file) = env::var("BATTLE_SETTINGS_FILE") {
            config.settings_file = PathBuf::from(file);
        }
        config.seed = read_env::<u64>("BATTLE_SEED");
        if let Some(pacing) = read_env::<bool>("BATTLE_PACING") {
            config.pacing = pacing;
        }
        if let Some(capacity) = read_env::<usize>("BATTLE_EVENT_BUFFER") {
            config.event_buffer_size = capacity.max(1);
        }

        config
    }
}

/// Platform-specific data directory for battle settings.
///
/// Follows platform conventions:
/// - macOS: `~/Library/Application Support/battle-sim`
/// - Linux: `~/.local/share/battle-sim` (or `$XDG_DATA_HOME/battle-sim`)
/// - Windows: `%APPDATA%\battle-sim`
/// - Fallback: `./sim_data`
fn data_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "battle-sim")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./sim_data"))
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
