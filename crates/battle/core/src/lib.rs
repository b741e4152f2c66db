//! Deterministic combat rules shared by every battle mode.
//!
//! `battle-core` defines combatants, teams, modifier tables, the resolution
//! engine and the battle state machine. It performs no I/O: the runtime crate
//! supplies participant data, persisted settings and pacing. All combat
//! mutation flows through [`battle::Battle`] and [`engine::CombatEngine`], and
//! every random draw goes through [`rng::BattleRng`].
pub mod battle;
pub mod battle_type;
pub mod class;
pub mod combatant;
pub mod config;
pub mod element;
pub mod engine;
pub mod error;
pub mod modifiers;
pub mod profile;
pub mod rng;
pub mod team;

pub use battle::{
    Battle, BattleId, BattleLog, BattleOutcome, BattleReport, BattleState, CombatantSummary,
    EndReason, TeamSummary,
};
pub use battle_type::{BattlePayload, BattleSpec, BattleType, TargetPolicy, TimeoutRule};
pub use class::{ClassLine, ClassSpec, TankProfile};
pub use combatant::{Buffs, Combatant, CombatantId};
pub use config::{BattleConfig, DamageStrategy, SettingKey, SettingsOverrides, validate_setting};
pub use element::{Affinity, Element, elemental_modifier};
pub use engine::{CombatEngine, Resolution, Slot, TurnEffect, TurnEvent};
pub use error::{BattleError, BattleStateError, ConfigError, ErrorSeverity};
pub use modifiers::{BuffProvider, ClassBuffProvider, ModifierResolver, StandardResolver};
pub use profile::{
    ElementProfile, MonsterTemplate, ParticipantId, ParticipantProfile, PetProfile, StatScaling,
};
pub use rng::{BattleRng, FixedRng, SeededRng};
pub use team::Team;
