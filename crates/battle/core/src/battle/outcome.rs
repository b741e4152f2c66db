//! Terminal result of a battle and the summary handed downstream.

use serde::{Deserialize, Serialize};

use super::BattleId;
use crate::battle_type::{BattlePayload, BattleType};
use crate::combatant::CombatantId;
use crate::engine::TurnEvent;

/// Why a battle stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// Every member of a team fell.
    Defeat,
    /// A team was withdrawn by the caller.
    Concession,
    /// The turn budget ran out.
    Timeout,
}

/// Final result, computed once by `Battle::end`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum BattleOutcome {
    Victory {
        winner: usize,
        loser: usize,
        reason: EndReason,
    },
    Tie {
        reason: EndReason,
    },
}

impl BattleOutcome {
    pub fn winner(&self) -> Option<usize> {
        match self {
            Self::Victory { winner, .. } => Some(*winner),
            Self::Tie { .. } => None,
        }
    }

    pub fn loser(&self) -> Option<usize> {
        match self {
            Self::Victory { loser, .. } => Some(*loser),
            Self::Tie { .. } => None,
        }
    }

    pub fn is_tie(&self) -> bool {
        matches!(self, Self::Tie { .. })
    }

    pub fn reason(&self) -> EndReason {
        match self {
            Self::Victory { reason, .. } | Self::Tie { reason } => *reason,
        }
    }
}

/// Final standing of one combatant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CombatantSummary {
    pub id: CombatantId,
    pub name: String,
    pub hp: f64,
    pub max_hp: f64,
    pub cheated_death: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TeamSummary {
    pub name: String,
    pub defeated: bool,
    pub members: Vec<CombatantSummary>,
}

/// Everything the reward layer needs once a battle is over.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BattleReport {
    pub battle_id: BattleId,
    pub battle_type: BattleType,
    pub outcome: BattleOutcome,
    pub turns: u32,
    pub payload: BattlePayload,
    pub teams: Vec<TeamSummary>,
    /// Most recent turns, oldest first.
    pub recent_turns: Vec<TurnEvent>,
}

impl BattleReport {
    pub fn winning_team(&self) -> Option<&TeamSummary> {
        self.outcome.winner().and_then(|i| self.teams.get(i))
    }
}
