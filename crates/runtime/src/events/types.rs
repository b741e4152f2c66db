//! Event payloads.

use battle_core::{BattleId, BattleReport, BattleType, TurnEvent};
use serde::{Deserialize, Serialize};

/// One resolved turn of a running battle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleTurn {
    pub battle_id: BattleId,
    pub event: TurnEvent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LifecycleEvent {
    Created {
        battle_id: BattleId,
        battle_type: BattleType,
    },
    Started {
        battle_id: BattleId,
    },
    Finished {
        report: BattleReport,
    },
    /// The battle could not be built or run to completion.
    Aborted {
        battle_id: Option<BattleId>,
        reason: String,
    },
}
