//! StatProvider over a fixed roster, for simulation and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use battle_content::{Roster, RosterEntry};
use battle_core::{ParticipantId, ParticipantProfile, PetProfile};

use crate::api::{ExternalError, StatProvider};

#[derive(Debug, Clone, Default)]
pub struct RosterStatProvider {
    entries: HashMap<ParticipantId, RosterEntry>,
}

impl RosterStatProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_roster(roster: Roster) -> Self {
        let entries = roster
            .participants
            .into_iter()
            .map(|entry| (entry.profile.id.clone(), entry))
            .collect();
        Self { entries }
    }

    /// Add or replace a participant.
    #[must_use]
    pub fn with(mut self, profile: ParticipantProfile, pet: Option<PetProfile>) -> Self {
        self.entries
            .insert(profile.id.clone(), RosterEntry { profile, pet });
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl StatProvider for RosterStatProvider {
    async fn participant(
        &self,
        id: &ParticipantId,
    ) -> Result<Option<ParticipantProfile>, ExternalError> {
        Ok(self.entries.get(id).map(|entry| entry.profile.clone()))
    }

    async fn pet(&self, owner: &ParticipantId) -> Result<Option<PetProfile>, ExternalError> {
        Ok(self.entries.get(owner).and_then(|entry| entry.pet.clone()))
    }
}
