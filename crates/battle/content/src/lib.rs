//! Data-driven battle content and loaders.
//!
//! This crate reads the static data a battle server needs at startup:
//! - Monster, tower and dragon tables (RON)
//! - Settings seeds: global and per-type defaults (TOML)
//! - Participant rosters for offline simulation (RON)
//!
//! Content is injected into the runtime's providers and settings registry and
//! never mutated after loading.

pub mod loaders;

pub use loaders::{
    BattleTables, ConfigLoader, ContentFactory, DragonStage, DragonTable, LoadResult, Roster,
    RosterEntry, RosterLoader, SettingsSeed, TablesLoader, TierMonsters, TowerFloor, TowerTable,
};
