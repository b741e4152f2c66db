//! Battle assembly.
//!
//! [`BattleFactory::create`] turns a type tag and a [`BattleSpec`] into a
//! `NotStarted` [`Battle`]: it resolves the config, fetches every participant
//! and monster from the injected providers, applies class buffs and shapes
//! the teams for the mode. It never touches the fight registry.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use battle_core::engine::round2;
use battle_core::{
    Battle, BattleConfig, BattleId, BattlePayload, BattleRng, BattleSpec, BattleType, BuffProvider,
    Buffs, ClassBuffProvider, Combatant, CombatantId, ConfigError, ModifierResolver, MonsterTemplate,
    ParticipantId, ParticipantProfile, PetProfile, SeededRng, SettingsOverrides, StandardResolver,
    Team,
};

use crate::api::{MonsterProvider, MonsterSpawn, Result, StatProvider};
use crate::settings::SettingsRegistry;

/// Builds battles from provider data.
pub struct BattleFactory {
    settings: Arc<SettingsRegistry>,
    stats: Arc<dyn StatProvider>,
    monsters: Arc<dyn MonsterProvider>,
    buffs: Arc<dyn BuffProvider>,
    resolver: Arc<dyn ModifierResolver>,
    next_id: AtomicU64,
    seed: Option<u64>,
}

impl BattleFactory {
    pub fn new(
        settings: Arc<SettingsRegistry>,
        stats: Arc<dyn StatProvider>,
        monsters: Arc<dyn MonsterProvider>,
    ) -> Self {
        Self {
            settings,
            stats,
            monsters,
            buffs: Arc::new(ClassBuffProvider),
            resolver: Arc::new(StandardResolver),
            next_id: AtomicU64::new(1),
            seed: None,
        }
    }

    #[must_use]
    pub fn with_buff_provider(mut self, buffs: Arc<dyn BuffProvider>) -> Self {
        self.buffs = buffs;
        self
    }

    #[must_use]
    pub fn with_resolver(mut self, resolver: Arc<dyn ModifierResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Make every battle reproducible: battle `n` draws from `seed + n`.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn settings(&self) -> &Arc<SettingsRegistry> {
        &self.settings
    }

    /// Assemble a battle for `type_tag`.
    ///
    /// Fails with a [`ConfigError`] when the tag is unknown or does not match
    /// the [`BattleSpec`] variant, when the participant lists are malformed,
    /// or when a participant or monster has no construction data. Provider
    /// failures are returned unchanged.
    pub async fn create(
        &self,
        type_tag: &str,
        spec: BattleSpec,
        overrides: &SettingsOverrides,
    ) -> Result<Battle> {
        let battle_type = BattleType::parse(type_tag)?;
        let provided = spec.battle_type();
        if provided != battle_type {
            return Err(ConfigError::MismatchedSpec {
                requested: battle_type,
                provided,
            }
            .into());
        }
        spec.validate()?;
        let config = self.settings.apply_to(battle_type, overrides)?;

        let id = BattleId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut rng = self.rng_for(id);
        let (teams, payload) = self.assemble(&config, spec, rng.as_mut()).await?;

        let battle = Battle::new(id, config, payload, teams)?
            .with_rng(rng)
            .with_resolver(Arc::clone(&self.resolver));

        tracing::info!(
            target: "runtime::factory",
            battle = %id,
            %battle_type,
            teams = battle.teams().len(),
            "battle created"
        );
        Ok(battle)
    }

    fn rng_for(&self, id: BattleId) -> Box<dyn BattleRng> {
        let rng = match self.seed {
            Some(seed) => SeededRng::new(seed.wrapping_add(id.0)),
            None => SeededRng::from_entropy(),
        };
        tracing::debug!(target: "runtime::factory", battle = %id, seed = rng.seed(), "battle rng seeded");
        Box::new(rng)
    }

    async fn assemble(
        &self,
        config: &BattleConfig,
        spec: BattleSpec,
        rng: &mut dyn BattleRng,
    ) -> Result<(Vec<Team>, BattlePayload)> {
        match spec {
            BattleSpec::Duel {
                challenger,
                opponent,
                stake,
            } => {
                let left = self.player(config, &challenger).await?;
                let right = self.player(config, &opponent).await?;
                let teams = vec![
                    Team::new(left.name.clone(), vec![left])?,
                    Team::new(right.name.clone(), vec![right])?,
                ];
                Ok((teams, BattlePayload::Duel { stake }))
            }
            BattleSpec::Raid {
                attackers,
                defenders,
                stake,
            } => {
                let teams = vec![
                    Team::new("attackers", self.players(config, &attackers).await?)?,
                    Team::new("defenders", self.players(config, &defenders).await?)?,
                ];
                Ok((teams, BattlePayload::Raid { stake }))
            }
            BattleSpec::Team { left, right, stake } => {
                let teams = self.sides(config, &left, &right).await?;
                Ok((teams, BattlePayload::Team { stake }))
            }
            BattleSpec::Brawl { left, right } => {
                let teams = self.sides(config, &left, &right).await?;
                Ok((teams, BattlePayload::Brawl))
            }
            BattleSpec::Pve { player, tier } => {
                let spawn = self.spawn(config.battle_type, u32::from(tier), rng).await?;
                let teams = self.solo_vs_monster(config, &player, spawn).await?;
                Ok((teams, BattlePayload::Pve { tier }))
            }
            BattleSpec::Tower { player, floor } => {
                let spawn = self.spawn(config.battle_type, floor, rng).await?;
                let teams = self.solo_vs_monster(config, &player, spawn).await?;
                Ok((teams, BattlePayload::Tower { floor }))
            }
            BattleSpec::Dragon { players, level } => {
                let spawn = self.spawn(config.battle_type, level, rng).await?;
                let payload = BattlePayload::Dragon {
                    level,
                    hp_multiplier: spawn.scaling.hp_multiplier,
                    damage_multiplier: spawn.scaling.damage_multiplier,
                };
                let boss = monster(&spawn.scaled()).as_dragon();
                let teams = vec![
                    Team::new(boss.name.clone(), vec![boss])?,
                    Team::new("players", self.players(config, &players).await?)?,
                ];
                Ok((teams, payload))
            }
            BattleSpec::CoopTower { players, floor } => {
                let spawn = self.spawn(config.battle_type, floor, rng).await?;
                let boss = monster(&spawn.scaled());
                let teams = vec![
                    Team::new("players", self.players(config, &players).await?)?,
                    Team::new(boss.name.clone(), vec![boss])?,
                ];
                Ok((teams, BattlePayload::CoopTower { floor }))
            }
        }
    }

    async fn sides(
        &self,
        config: &BattleConfig,
        left: &[ParticipantId],
        right: &[ParticipantId],
    ) -> Result<Vec<Team>> {
        Ok(vec![
            Team::new("left", self.players(config, left).await?)?,
            Team::new("right", self.players(config, right).await?)?,
        ])
    }

    /// Player (plus pet when allowed) against one monster.
    async fn solo_vs_monster(
        &self,
        config: &BattleConfig,
        id: &ParticipantId,
        spawn: MonsterSpawn,
    ) -> Result<Vec<Team>> {
        let player = self.player(config, id).await?;
        let name = player.name.clone();
        let mut members = vec![player];
        if let Some(pet) = self.pet(config, id).await? {
            members.push(pet);
        }

        let foe = monster(&spawn.scaled());
        Ok(vec![
            Team::new(name, members)?,
            Team::new(foe.name.clone(), vec![foe])?,
        ])
    }

    async fn players(&self, config: &BattleConfig, ids: &[ParticipantId]) -> Result<Vec<Combatant>> {
        let mut players = Vec::with_capacity(ids.len());
        for id in ids {
            players.push(self.player(config, id).await?);
        }
        Ok(players)
    }

    async fn player(&self, config: &BattleConfig, id: &ParticipantId) -> Result<Combatant> {
        let profile = self.stats.participant(id).await?.ok_or_else(|| {
            ConfigError::MissingConstructionData {
                battle_type: config.battle_type,
                subject: format!("participant '{id}'"),
            }
        })?;
        Ok(build_player(config, self.buffs.as_ref(), profile))
    }

    async fn pet(&self, config: &BattleConfig, owner: &ParticipantId) -> Result<Option<Combatant>> {
        if !config.allow_pets || !config.battle_type.supports_pets() {
            return Ok(None);
        }
        let pet = self.stats.pet(owner).await?;
        Ok(pet.map(|pet| build_pet(owner, pet)))
    }

    async fn spawn(
        &self,
        battle_type: BattleType,
        tier: u32,
        rng: &mut dyn BattleRng,
    ) -> Result<MonsterSpawn> {
        let spawn = self.monsters.monster(battle_type, tier, rng).await?;
        spawn.ok_or_else(|| {
            ConfigError::MissingConstructionData {
                battle_type,
                subject: format!("monster at tier {tier}"),
            }
            .into()
        })
    }
}

/// Player combatant from raw stats.
///
/// With class buffs on, the class list sets the buffs and the tank health
/// multiplier scales max hp.
pub fn build_player(
    config: &BattleConfig,
    buffs: &dyn BuffProvider,
    profile: ParticipantProfile,
) -> Combatant {
    let (resolved, health) = if config.class_buffs {
        (
            buffs.resolve_buffs(&profile.classes, profile.has_shield),
            buffs.health_multiplier(&profile.classes, profile.has_shield),
        )
    } else {
        (
            Buffs {
                has_shield: profile.has_shield,
                ..Buffs::default()
            },
            1.0,
        )
    };

    Combatant::new(
        CombatantId::Player(profile.id),
        profile.name,
        round2(profile.hp_pool * health),
        profile.base_damage,
        profile.base_armor,
    )
    .with_elements(profile.elements.attack, profile.elements.defense)
    .with_dual_elements(profile.elements.dual)
    .with_luck(profile.luck)
    .with_buffs(resolved)
}

fn build_pet(owner: &ParticipantId, pet: PetProfile) -> Combatant {
    Combatant::new(CombatantId::Pet(owner.clone()), pet.name, pet.hp, pet.damage, pet.armor)
        .with_elements(pet.element, pet.element)
        .as_pet()
}

fn monster(template: &MonsterTemplate) -> Combatant {
    Combatant::new(
        CombatantId::Monster(template.name.clone()),
        template.name.clone(),
        template.hp,
        template.attack,
        template.defense,
    )
    .with_elements(template.element, template.element)
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::{ClassLine, ClassSpec, Element, ElementProfile};

    fn profile() -> ParticipantProfile {
        ParticipantProfile {
            id: ParticipantId::from("borin"),
            name: "Borin".into(),
            hp_pool: 150.0,
            base_damage: 12.0,
            base_armor: 6.0,
            elements: ElementProfile::single(Element::Water),
            classes: vec![ClassSpec::new(ClassLine::Tank, 4)],
            luck: 50.0,
            has_shield: true,
        }
    }

    #[test]
    fn class_buffs_scale_max_hp() {
        let config = BattleConfig::defaults(BattleType::Duel);
        let expected = round2(
            150.0 * ClassBuffProvider.health_multiplier(&[ClassSpec::new(ClassLine::Tank, 4)], true),
        );

        let player = build_player(&config, &ClassBuffProvider, profile());
        assert_eq!(player.max_hp(), expected);
        assert!(player.buffs.has_shield);
        assert_eq!(player.buffs.tank_tier, Some(4));
    }

    #[test]
    fn disabled_class_buffs_keep_raw_stats() {
        let config = BattleConfig {
            class_buffs: false,
            ..BattleConfig::defaults(BattleType::Duel)
        };

        let player = build_player(&config, &ClassBuffProvider, profile());
        assert_eq!(player.max_hp(), 150.0);
        assert_eq!(player.buffs.tank_tier, None);
        assert!(player.buffs.has_shield);
    }
}
