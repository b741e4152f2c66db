//! Participant roster loader, used for offline simulation and fixtures.

use std::collections::HashSet;
use std::path::Path;

use battle_core::{ParticipantProfile, PetProfile};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub profile: ParticipantProfile,
    #[serde(default)]
    pub pet: Option<PetProfile>,
}

/// Roster structure for RON files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    pub participants: Vec<RosterEntry>,
}

/// Loader for participant rosters from RON files.
pub struct RosterLoader;

impl RosterLoader {
    pub fn load(path: &Path) -> LoadResult<Roster> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<Roster> {
        let roster: Roster = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse roster RON: {}", e))?;

        let mut ids = HashSet::new();
        for entry in &roster.participants {
            anyhow::ensure!(
                ids.insert(entry.profile.id.clone()),
                "Duplicate participant '{}' in roster",
                entry.profile.id
            );
        }
        Ok(roster)
    }
}
