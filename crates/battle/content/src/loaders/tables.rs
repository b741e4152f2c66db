//! Monster, tower and dragon tables.
//!
//! Loaded once at startup into an immutable [`BattleTables`] and injected into
//! the runtime's monster provider.

use std::collections::HashSet;
use std::path::Path;

use battle_core::{MonsterTemplate, StatScaling};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Monsters available at one PvE tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierMonsters {
    pub tier: u8,
    pub monsters: Vec<MonsterTemplate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TowerFloor {
    pub floor: u32,
    pub monster: MonsterTemplate,
}

/// Tower floors plus growth for floors past the last listed one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TowerTable {
    #[serde(default)]
    pub floors: Vec<TowerFloor>,
    /// Added to the hp multiplier per floor above the nearest listed floor.
    #[serde(default)]
    pub hp_growth: f64,
    #[serde(default)]
    pub damage_growth: f64,
    /// Extra scaling for the two-player co-op tower boss.
    #[serde(default = "default_coop_scaling")]
    pub coop: StatScaling,
}

impl Default for TowerTable {
    fn default() -> Self {
        Self {
            floors: Vec::new(),
            hp_growth: 0.0,
            damage_growth: 0.0,
            coop: default_coop_scaling(),
        }
    }
}

fn default_coop_scaling() -> StatScaling {
    StatScaling::new(2.0, 1.5)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DragonStage {
    pub level: u32,
    pub hp_multiplier: f64,
    pub damage_multiplier: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DragonTable {
    pub boss: MonsterTemplate,
    #[serde(default)]
    pub stages: Vec<DragonStage>,
}

/// All encounter tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BattleTables {
    #[serde(default)]
    pub monsters: Vec<TierMonsters>,
    #[serde(default)]
    pub tower: TowerTable,
    #[serde(default)]
    pub dragon: Option<DragonTable>,
}

impl BattleTables {
    /// Monsters of a PvE tier; empty when the tier is unknown.
    pub fn pve_monsters(&self, tier: u8) -> &[MonsterTemplate] {
        self.monsters
            .iter()
            .find(|t| t.tier == tier)
            .map(|t| t.monsters.as_slice())
            .unwrap_or(&[])
    }

    /// Monster guarding `floor`, scaled from the nearest listed floor below.
    pub fn tower_floor(&self, floor: u32) -> Option<(&MonsterTemplate, StatScaling)> {
        let entry = self
            .tower
            .floors
            .iter()
            .filter(|f| f.floor <= floor)
            .max_by_key(|f| f.floor)?;
        let extra = f64::from(floor - entry.floor);
        let scaling = StatScaling::new(
            1.0 + self.tower.hp_growth * extra,
            1.0 + self.tower.damage_growth * extra,
        );
        Some((&entry.monster, scaling))
    }

    /// Co-op tower boss: the tower floor monster with co-op scaling on top.
    pub fn coop_floor(&self, floor: u32) -> Option<(&MonsterTemplate, StatScaling)> {
        self.tower_floor(floor)
            .map(|(monster, scaling)| (monster, scaling.then(self.tower.coop)))
    }

    /// Dragon boss and the multipliers of the highest stage at or below `level`.
    pub fn dragon_stage(&self, level: u32) -> Option<(&MonsterTemplate, StatScaling)> {
        let dragon = self.dragon.as_ref()?;
        let scaling = dragon
            .stages
            .iter()
            .filter(|s| s.level <= level)
            .max_by_key(|s| s.level)
            .map(|s| StatScaling::new(s.hp_multiplier, s.damage_multiplier))
            .unwrap_or(StatScaling::IDENTITY);
        Some((&dragon.boss, scaling))
    }

    /// Reject tables the providers could not serve sensibly.
    pub fn validate(&self) -> LoadResult<()> {
        let mut tiers = HashSet::new();
        for tier in &self.monsters {
            anyhow::ensure!(tiers.insert(tier.tier), "Duplicate monster tier {}", tier.tier);
            anyhow::ensure!(!tier.monsters.is_empty(), "Monster tier {} is empty", tier.tier);
            for monster in &tier.monsters {
                check_monster(monster)?;
            }
        }

        let mut floors = HashSet::new();
        for floor in &self.tower.floors {
            anyhow::ensure!(floors.insert(floor.floor), "Duplicate tower floor {}", floor.floor);
            check_monster(&floor.monster)?;
        }

        if let Some(dragon) = &self.dragon {
            check_monster(&dragon.boss)?;
            for stage in &dragon.stages {
                anyhow::ensure!(
                    stage.hp_multiplier > 0.0 && stage.damage_multiplier > 0.0,
                    "Dragon stage {} has a non-positive multiplier",
                    stage.level
                );
            }
        }
        Ok(())
    }
}

fn check_monster(monster: &MonsterTemplate) -> LoadResult<()> {
    anyhow::ensure!(!monster.name.trim().is_empty(), "Monster with an empty name");
    anyhow::ensure!(
        monster.hp > 0.0 && monster.attack >= 0.0 && monster.defense >= 0.0,
        "Monster '{}' has invalid stats",
        monster.name
    );
    Ok(())
}

/// Loader for encounter tables from RON files.
pub struct TablesLoader;

impl TablesLoader {
    /// Load and validate tables from a RON file.
    pub fn load(path: &Path) -> LoadResult<BattleTables> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<BattleTables> {
        let tables: BattleTables = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse battle tables RON: {}", e))?;
        tables.validate()?;
        Ok(tables)
    }
}
