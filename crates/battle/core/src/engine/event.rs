//! Structured record of one resolved action, handed to presentation.

use serde::{Deserialize, Serialize};

use crate::combatant::CombatantId;
use crate::element::Element;

/// Side effect observed while resolving an action.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TurnEffect {
    /// Attacker's element counters the defender.
    Countered,
    /// Defender's element counters the attacker.
    Resisted,
    /// Target survived a lethal blow with 1 hp.
    DeathCheated,
    Lifesteal { amount: f64 },
    Reflected { amount: f64 },
    /// Target dropped to 0 hp.
    Killed,
    /// Actor dropped to 0 hp from reflected damage.
    ActorKilled,
}

/// Where a combatant sits inside a battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Slot {
    pub team: usize,
    pub index: usize,
}

impl Slot {
    pub const fn new(team: usize, index: usize) -> Self {
        Self { team, index }
    }
}

/// Outcome of one `process_turn()` call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TurnEvent {
    /// 1-based turn number.
    pub turn: u32,
    pub actor: CombatantId,
    pub actor_slot: Slot,
    pub target: CombatantId,
    pub target_slot: Slot,
    pub element: Element,
    /// Hp actually removed from the target.
    pub damage: f64,
    pub target_hp: f64,
    pub actor_hp: f64,
    pub effects: Vec<TurnEffect>,
}

impl TurnEvent {
    pub fn has_effect(&self, effect: &TurnEffect) -> bool {
        self.effects.iter().any(|e| e == effect)
    }

    pub fn killed_target(&self) -> bool {
        self.has_effect(&TurnEffect::Killed)
    }
}
