//! Asynchronous abstractions for the data a battle is built from.
//!
//! Runtime users plug in [`StatProvider`] and [`MonsterProvider`]
//! implementations so battles can be assembled from a live game database,
//! static fixtures or the content tables. The core never computes stats
//! itself.
use async_trait::async_trait;
use battle_core::{BattleReport, BattleRng, BattleType, MonsterTemplate, ParticipantId, ParticipantProfile, PetProfile, StatScaling};

use super::errors::ExternalError;

/// Source of player construction data.
#[async_trait]
pub trait StatProvider: Send + Sync {
    /// Stats, equipment elements and classes of a participant.
    ///
    /// `Ok(None)` means the participant is unknown; `Err` means the provider
    /// could not answer.
    async fn participant(
        &self,
        id: &ParticipantId,
    ) -> Result<Option<ParticipantProfile>, ExternalError>;

    /// The active pet of `owner`, if any.
    async fn pet(&self, _owner: &ParticipantId) -> Result<Option<PetProfile>, ExternalError> {
        Ok(None)
    }
}

/// A monster to spawn plus the scaling the encounter applies to it.
#[derive(Clone, Debug, PartialEq)]
pub struct MonsterSpawn {
    pub template: MonsterTemplate,
    pub scaling: StatScaling,
}

impl MonsterSpawn {
    pub fn unscaled(template: MonsterTemplate) -> Self {
        Self {
            template,
            scaling: StatScaling::IDENTITY,
        }
    }

    /// Template with the scaling applied.
    pub fn scaled(&self) -> MonsterTemplate {
        self.template.scaled(self.scaling)
    }
}

/// Source of monster and boss data.
#[async_trait]
pub trait MonsterProvider: Send + Sync {
    /// Monster for an encounter. `tier` is the PvE tier, tower floor or
    /// dragon level depending on `battle_type`.
    ///
    /// `rng` is the battle's own generator; random choices made here replay
    /// with the battle's seed.
    async fn monster(
        &self,
        battle_type: BattleType,
        tier: u32,
        rng: &mut dyn BattleRng,
    ) -> Result<Option<MonsterSpawn>, ExternalError>;
}

/// Downstream consumer of finished battles (rewards, progression, history).
///
/// Invoked once per battle, after `end()`; it only ever sees the report.
#[async_trait]
pub trait OutcomeSink: Send + Sync {
    async fn record(&self, report: &BattleReport) -> Result<(), ExternalError>;
}
