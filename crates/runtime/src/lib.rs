//! Runtime orchestration for battles.
//!
//! This crate wires the deterministic `battle-core` rules to the outside
//! world: persisted settings, asynchronous stat and monster providers, the
//! process-wide fight registry, display pacing and an event bus. Consumers
//! embed an [`Arena`] and call [`Arena::fight`] once per battle.
//!
//! Modules are organized by responsibility:
//! - [`arena`] hosts the service and its builder
//! - [`api`] exposes provider traits and error types downstream clients use
//! - [`settings`] and [`repository`] provide layered, durable settings
//! - [`factory`] assembles battles, [`runner`] drives them to completion
//! - [`fights`] keeps each participant in at most one battle
//! - [`events`] provides topic-based event bus for presentation
//! - [`oracle`] serves providers from static content tables
pub mod api;
pub mod arena;
pub mod events;
pub mod factory;
pub mod fights;
pub mod oracle;
pub mod pacer;
pub mod repository;
pub mod runner;
pub mod settings;

pub use api::{
    ExternalError, MonsterProvider, MonsterSpawn, OutcomeSink, ProviderKind, Result, RuntimeError,
    StatProvider,
};
pub use arena::{Arena, ArenaBuilder, ArenaConfig};
pub use events::{BattleTurn, Event, EventBus, LifecycleEvent, Topic};
pub use factory::BattleFactory;
pub use fights::{FightGuard, FightRegistry, FightToken};
pub use oracle::{RosterStatProvider, TableMonsterProvider};
pub use pacer::{InstantPacer, Pacer, TokioPacer};
pub use repository::{
    FileSettingsRepository, InMemorySettingsRepo, RepositoryError, SettingsMap,
    SettingsRepository, SettingsScope,
};
pub use runner::BattleRunner;
pub use settings::SettingsRegistry;
