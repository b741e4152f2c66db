//! MonsterProvider over the loaded encounter tables.

use std::sync::Arc;

use async_trait::async_trait;
use battle_content::BattleTables;
use battle_core::{BattleRng, BattleType, MonsterTemplate, StatScaling};

use crate::api::{ExternalError, MonsterProvider, MonsterSpawn};

/// Serves PvE monsters, tower guardians, co-op bosses and the dragon from
/// [`BattleTables`].
///
/// A PvE tier with several monsters yields a uniformly random one, drawn
/// from the battle's RNG.
#[derive(Debug, Clone, Default)]
pub struct TableMonsterProvider {
    tables: Arc<BattleTables>,
}

impl TableMonsterProvider {
    pub fn new(tables: Arc<BattleTables>) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &BattleTables {
        &self.tables
    }

    fn spawn(
        &self,
        battle_type: BattleType,
        tier: u32,
        rng: &mut dyn BattleRng,
    ) -> Option<MonsterSpawn> {
        match battle_type {
            BattleType::Pve => {
                let tier = u8::try_from(tier).ok()?;
                pick(self.tables.pve_monsters(tier), rng)
                    .cloned()
                    .map(MonsterSpawn::unscaled)
            }
            BattleType::Tower => self.tables.tower_floor(tier).map(to_spawn),
            BattleType::CoopTower => self.tables.coop_floor(tier).map(to_spawn),
            BattleType::Dragon => self.tables.dragon_stage(tier).map(to_spawn),
            BattleType::Duel | BattleType::Raid | BattleType::Team | BattleType::Brawl => None,
        }
    }
}

fn to_spawn((template, scaling): (&MonsterTemplate, StatScaling)) -> MonsterSpawn {
    MonsterSpawn {
        template: template.clone(),
        scaling,
    }
}

fn pick<'a>(
    monsters: &'a [MonsterTemplate],
    rng: &mut dyn BattleRng,
) -> Option<&'a MonsterTemplate> {
    if monsters.is_empty() {
        return None;
    }
    monsters.get(rng.index(monsters.len()))
}

#[async_trait]
impl MonsterProvider for TableMonsterProvider {
    async fn monster(
        &self,
        battle_type: BattleType,
        tier: u32,
        rng: &mut dyn BattleRng,
    ) -> Result<Option<MonsterSpawn>, ExternalError> {
        let spawn = self.spawn(battle_type, tier, rng);
        if spawn.is_none() {
            tracing::debug!(
                target: "runtime::oracle",
                %battle_type,
                tier,
                "no monster in tables"
            );
        }
        Ok(spawn)
    }
}
