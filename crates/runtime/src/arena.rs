//! High-level battle service.
//!
//! The arena wires the settings registry, factory, fight registry and runner
//! together and exposes one call per battle:
//!
//! ```text
//! enter_all(participants) → create → run → release
//! ```
//!
//! Release happens when the [`FightGuard`](crate::fights::FightGuard) drops,
//! so every exit path (error, panic, cancelled task) frees the participants.

use std::sync::Arc;

use battle_core::{
    BattleReport, BattleSpec, BuffProvider, ModifierResolver, ParticipantId, SettingsOverrides,
};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::api::{MonsterProvider, OutcomeSink, ProviderKind, Result, RuntimeError, StatProvider};
use crate::events::{Event, EventBus, LifecycleEvent, Topic};
use crate::factory::BattleFactory;
use crate::fights::FightRegistry;
use crate::pacer::{InstantPacer, Pacer, TokioPacer};
use crate::repository::InMemorySettingsRepo;
use crate::runner::BattleRunner;
use crate::settings::SettingsRegistry;

/// Arena configuration.
#[derive(Debug, Clone)]
pub struct ArenaConfig {
    pub event_buffer_size: usize,
    /// Sleep `turn_delay_ms` between turns. Off for simulation and tests.
    pub pacing: bool,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            event_buffer_size: 100,
            pacing: true,
        }
    }
}

/// Cloneable battle service; clones share registries and the event bus.
#[derive(Clone)]
pub struct Arena {
    factory: Arc<BattleFactory>,
    fights: Arc<FightRegistry>,
    runner: Arc<BattleRunner>,
    events: EventBus,
}

impl Arena {
    /// Create a new arena builder
    pub fn builder() -> ArenaBuilder {
        ArenaBuilder::new()
    }

    /// Build and run one battle while its participants are registered as
    /// fighting.
    ///
    /// Fails with [`RuntimeError::Concurrency`] before anything is built if a
    /// participant is already in a battle.
    pub async fn fight(
        &self,
        type_tag: &str,
        spec: BattleSpec,
        overrides: &SettingsOverrides,
    ) -> Result<BattleReport> {
        let participants: Vec<ParticipantId> = spec.participants().into_iter().cloned().collect();
        let _guard = self.fights.enter_all(participants)?;

        let mut battle = match self.factory.create(type_tag, spec, overrides).await {
            Ok(battle) => battle,
            Err(err) => {
                self.abort(None, &err);
                return Err(err);
            }
        };
        self.events.publish(Event::Lifecycle(LifecycleEvent::Created {
            battle_id: battle.id(),
            battle_type: battle.battle_type(),
        }));

        match self.runner.run(&mut battle).await {
            Ok(report) => Ok(report),
            Err(err) => {
                self.abort(Some(battle.id()), &err);
                Err(err)
            }
        }
    }

    /// Run [`fight`](Self::fight) on its own task.
    pub fn spawn_fight(
        &self,
        type_tag: impl Into<String>,
        spec: BattleSpec,
        overrides: SettingsOverrides,
    ) -> JoinHandle<Result<BattleReport>> {
        let arena = self.clone();
        let type_tag = type_tag.into();
        tokio::spawn(async move { arena.fight(&type_tag, spec, &overrides).await })
    }

    fn abort(&self, battle_id: Option<battle_core::BattleId>, err: &RuntimeError) {
        tracing::warn!(
            target: "runtime::arena",
            battle = ?battle_id,
            error = %err,
            "battle aborted"
        );
        self.events.publish(Event::Lifecycle(LifecycleEvent::Aborted {
            battle_id,
            reason: err.to_string(),
        }));
    }

    pub fn settings(&self) -> &Arc<SettingsRegistry> {
        self.factory.settings()
    }

    pub fn factory(&self) -> &Arc<BattleFactory> {
        &self.factory
    }

    pub fn fights(&self) -> &Arc<FightRegistry> {
        &self.fights
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Subscribe to a topic of the arena's event bus.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.events.subscribe(topic)
    }
}

/// Builder for [`Arena`] with flexible configuration.
pub struct ArenaBuilder {
    config: ArenaConfig,
    settings: Option<Arc<SettingsRegistry>>,
    stats: Option<Arc<dyn StatProvider>>,
    monsters: Option<Arc<dyn MonsterProvider>>,
    sink: Option<Arc<dyn OutcomeSink>>,
    buffs: Option<Arc<dyn BuffProvider>>,
    resolver: Option<Arc<dyn ModifierResolver>>,
    pacer: Option<Arc<dyn Pacer>>,
    fights: Option<Arc<FightRegistry>>,
    seed: Option<u64>,
}

impl ArenaBuilder {
    fn new() -> Self {
        Self {
            config: ArenaConfig::default(),
            settings: None,
            stats: None,
            monsters: None,
            sink: None,
            buffs: None,
            resolver: None,
            pacer: None,
            fights: None,
            seed: None,
        }
    }

    /// Override arena configuration
    pub fn config(mut self, config: ArenaConfig) -> Self {
        self.config = config;
        self
    }

    /// Settings registry. Defaults to an empty in-memory store.
    pub fn settings(mut self, settings: Arc<SettingsRegistry>) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Set required stat provider
    pub fn stat_provider(mut self, provider: impl StatProvider + 'static) -> Self {
        self.stats = Some(Arc::new(provider));
        self
    }

    /// Set required monster provider
    pub fn monster_provider(mut self, provider: impl MonsterProvider + 'static) -> Self {
        self.monsters = Some(Arc::new(provider));
        self
    }

    pub fn outcome_sink(mut self, sink: impl OutcomeSink + 'static) -> Self {
        self.sink = Some(Arc::new(sink));
        self
    }

    pub fn buff_provider(mut self, buffs: impl BuffProvider + 'static) -> Self {
        self.buffs = Some(Arc::new(buffs));
        self
    }

    pub fn resolver(mut self, resolver: impl ModifierResolver + 'static) -> Self {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    /// Replace the pacer chosen from [`ArenaConfig::pacing`].
    pub fn pacer(mut self, pacer: impl Pacer + 'static) -> Self {
        self.pacer = Some(Arc::new(pacer));
        self
    }

    /// Share a fight registry with other arenas in the process.
    pub fn fights(mut self, fights: Arc<FightRegistry>) -> Self {
        self.fights = Some(fights);
        self
    }

    /// Seed every battle's RNG for reproducible runs.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Build the arena.
    ///
    /// Fails with [`RuntimeError::MissingProvider`] when no stat or monster
    /// provider was set.
    pub fn build(self) -> Result<Arena> {
        let stats = self.stats.ok_or(RuntimeError::MissingProvider {
            kind: ProviderKind::Stat,
        })?;
        let monsters = self.monsters.ok_or(RuntimeError::MissingProvider {
            kind: ProviderKind::Monster,
        })?;
        let settings = match self.settings {
            Some(settings) => settings,
            None => Arc::new(SettingsRegistry::new(Arc::new(InMemorySettingsRepo::new()))?),
        };

        let mut factory = BattleFactory::new(settings, stats, monsters);
        if let Some(buffs) = self.buffs {
            factory = factory.with_buff_provider(buffs);
        }
        if let Some(resolver) = self.resolver {
            factory = factory.with_resolver(resolver);
        }
        if let Some(seed) = self.seed {
            factory = factory.with_seed(seed);
        }

        let pacer: Arc<dyn Pacer> = match self.pacer {
            Some(pacer) => pacer,
            None if self.config.pacing => Arc::new(TokioPacer),
            None => Arc::new(InstantPacer),
        };
        let events = EventBus::with_capacity(self.config.event_buffer_size);
        let mut runner = BattleRunner::new(pacer, events.clone());
        if let Some(sink) = self.sink {
            runner = runner.with_sink(sink);
        }

        tracing::debug!(
            target: "runtime::arena",
            pacing = self.config.pacing,
            event_buffer_size = self.config.event_buffer_size,
            "arena built"
        );
        Ok(Arena {
            factory: Arc::new(factory),
            fights: self.fights.unwrap_or_default(),
            runner: Arc::new(runner),
            events,
        })
    }
}
