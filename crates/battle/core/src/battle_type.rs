//! Battle modes and the per-mode rules that differ between them.
//!
//! [`BattleType`] is the fixed tag; [`BattleSpec`] is the tagged union a caller
//! fills in to request a battle, one variant per type carrying only that
//! type's validated fields; [`BattlePayload`] is the per-type data a built
//! battle keeps for downstream consumers (stake, tier, floor, multipliers).

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::error::ConfigError;
use crate::profile::ParticipantId;

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BattleType {
    Duel,
    Pve,
    Raid,
    Tower,
    Team,
    Brawl,
    Dragon,
    CoopTower,
}

/// How an acting combatant picks its target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetPolicy {
    /// First living member of the next opposing team.
    FirstAliveOpponent,
    /// Uniformly random living member across all opposing teams.
    RandomOpponent,
    /// The boss side picks a random living player; players hit the boss side.
    BossHitsRandomPlayer { boss_team: usize },
}

/// What happens when the turn budget runs out with no team defeated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeoutRule {
    Tie,
    /// The given team loses (the player side in PvE-like modes).
    Defeat { loser: usize },
}

impl BattleType {
    /// Parse a type tag, mapping failures to [`ConfigError::UnknownBattleType`].
    pub fn parse(tag: &str) -> Result<Self, ConfigError> {
        tag.parse()
            .map_err(|_| ConfigError::UnknownBattleType(tag.to_string()))
    }

    pub fn target_policy(self) -> TargetPolicy {
        match self {
            Self::Duel | Self::Raid | Self::Pve | Self::Tower => TargetPolicy::FirstAliveOpponent,
            Self::Team | Self::Brawl => TargetPolicy::RandomOpponent,
            Self::Dragon | Self::CoopTower => TargetPolicy::BossHitsRandomPlayer {
                boss_team: self.boss_team().unwrap_or(0),
            },
        }
    }

    pub fn timeout_rule(self) -> TimeoutRule {
        match self.player_team() {
            Some(team) if self.is_player_vs_environment() => TimeoutRule::Defeat { loser: team },
            _ => TimeoutRule::Tie,
        }
    }

    /// Index of the team holding the players in player-vs-environment modes.
    pub fn player_team(self) -> Option<usize> {
        match self {
            Self::Pve | Self::Tower | Self::CoopTower => Some(0),
            Self::Dragon => Some(1),
            Self::Duel | Self::Raid | Self::Team | Self::Brawl => None,
        }
    }

    /// Index of the boss team in boss modes.
    pub fn boss_team(self) -> Option<usize> {
        match self {
            Self::Dragon => Some(0),
            Self::CoopTower => Some(1),
            _ => None,
        }
    }

    pub fn is_player_vs_environment(self) -> bool {
        matches!(self, Self::Pve | Self::Tower | Self::Dragon | Self::CoopTower)
    }

    /// Whether players may bring their pet into this mode.
    pub fn supports_pets(self) -> bool {
        matches!(self, Self::Pve | Self::Tower)
    }
}

/// A request for one battle, one variant per [`BattleType`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BattleSpec {
    Duel {
        challenger: ParticipantId,
        opponent: ParticipantId,
        #[serde(default)]
        stake: u64,
    },
    Pve {
        player: ParticipantId,
        tier: u8,
    },
    Raid {
        attackers: Vec<ParticipantId>,
        defenders: Vec<ParticipantId>,
        #[serde(default)]
        stake: u64,
    },
    Tower {
        player: ParticipantId,
        floor: u32,
    },
    Team {
        left: Vec<ParticipantId>,
        right: Vec<ParticipantId>,
        #[serde(default)]
        stake: u64,
    },
    Brawl {
        left: Vec<ParticipantId>,
        right: Vec<ParticipantId>,
    },
    Dragon {
        players: Vec<ParticipantId>,
        level: u32,
    },
    CoopTower {
        players: [ParticipantId; 2],
        floor: u32,
    },
}

impl BattleSpec {
    pub fn battle_type(&self) -> BattleType {
        match self {
            Self::Duel { .. } => BattleType::Duel,
            Self::Pve { .. } => BattleType::Pve,
            Self::Raid { .. } => BattleType::Raid,
            Self::Tower { .. } => BattleType::Tower,
            Self::Team { .. } => BattleType::Team,
            Self::Brawl { .. } => BattleType::Brawl,
            Self::Dragon { .. } => BattleType::Dragon,
            Self::CoopTower { .. } => BattleType::CoopTower,
        }
    }

    /// Every participant in the request, in team order.
    pub fn participants(&self) -> Vec<&ParticipantId> {
        match self {
            Self::Duel {
                challenger,
                opponent,
                ..
            } => vec![challenger, opponent],
            Self::Pve { player, .. } | Self::Tower { player, .. } => vec![player],
            Self::Raid {
                attackers: left,
                defenders: right,
                ..
            }
            | Self::Team { left, right, .. }
            | Self::Brawl { left, right } => left.iter().chain(right.iter()).collect(),
            Self::Dragon { players, .. } => players.iter().collect(),
            Self::CoopTower { players, .. } => players.iter().collect(),
        }
    }

    /// Check participant counts and uniqueness.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let battle_type = self.battle_type();
        match self {
            Self::Raid {
                attackers: left,
                defenders: right,
                ..
            }
            | Self::Team { left, right, .. }
            | Self::Brawl { left, right } => {
                for side in [left, right] {
                    if side.is_empty() {
                        return Err(ConfigError::ParticipantCount {
                            battle_type,
                            expected: "at least one per side",
                            actual: 0,
                        });
                    }
                }
            }
            Self::Dragon { players, .. } if players.is_empty() => {
                return Err(ConfigError::ParticipantCount {
                    battle_type,
                    expected: "at least one",
                    actual: 0,
                });
            }
            _ => {}
        }

        let mut seen = std::collections::HashSet::new();
        for id in self.participants() {
            if !seen.insert(id) {
                return Err(ConfigError::DuplicateParticipant(id.to_string()));
            }
        }
        Ok(())
    }
}

/// Per-type data kept on a built battle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BattlePayload {
    Duel { stake: u64 },
    Pve { tier: u8 },
    Raid { stake: u64 },
    Tower { floor: u32 },
    Team { stake: u64 },
    Brawl,
    Dragon {
        level: u32,
        hp_multiplier: f64,
        damage_multiplier: f64,
    },
    CoopTower { floor: u32 },
}

impl BattlePayload {
    /// Money at stake, for modes that wager.
    pub fn stake(&self) -> Option<u64> {
        match self {
            Self::Duel { stake } | Self::Raid { stake } | Self::Team { stake } => Some(*stake),
            _ => None,
        }
    }
}
