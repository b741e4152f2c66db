//! Shared fixtures for runtime integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use battle_content::{BattleTables, TablesLoader};
use battle_core::{
    BattleReport, ElementProfile, Element, ParticipantId, ParticipantProfile, PetProfile,
};
use battle_runtime::{
    Arena, ArenaConfig, ExternalError, InMemorySettingsRepo, OutcomeSink, RosterStatProvider,
    SettingsRegistry, TableMonsterProvider,
};

pub const TABLES: &str = r#"(
    monsters: [
        (tier: 1, monsters: [(name: "Slime", hp: 40.0, attack: 6.0, defense: 0.0)]),
        (tier: 2, monsters: [
            (name: "Rat", hp: 30.0, attack: 4.0, defense: 0.0),
            (name: "Bat", hp: 25.0, attack: 5.0, defense: 0.0),
        ]),
    ],
    tower: (
        floors: [(floor: 1, monster: (name: "Gatekeeper", hp: 80.0, attack: 8.0, defense: 0.0))],
        hp_growth: 0.5,
        damage_growth: 0.25,
    ),
    dragon: Some((
        boss: (name: "Ember Wyrm", hp: 1000.0, attack: 30.0, defense: 0.0),
        stages: [(level: 5, hp_multiplier: 2.0, damage_multiplier: 1.5)],
    )),
)"#;

pub fn id(s: &str) -> ParticipantId {
    ParticipantId::from(s)
}

pub fn profile(name: &str, hp: f64, damage: f64) -> ParticipantProfile {
    ParticipantProfile {
        id: id(name),
        name: name.to_uppercase(),
        hp_pool: hp,
        base_damage: damage,
        base_armor: 0.0,
        elements: ElementProfile::single(Element::Unknown),
        classes: Vec::new(),
        luck: 50.0,
        has_shield: false,
    }
}

pub fn pet() -> PetProfile {
    PetProfile {
        name: "Pip".into(),
        hp: 30.0,
        damage: 3.0,
        armor: 0.0,
        element: Element::Unknown,
    }
}

/// `a` hits hard and owns a pet; everyone else is plain.
pub fn roster() -> RosterStatProvider {
    RosterStatProvider::new()
        .with(profile("a", 100.0, 20.0), Some(pet()))
        .with(profile("b", 100.0, 5.0), None)
        .with(profile("c", 100.0, 10.0), None)
        .with(profile("d", 100.0, 10.0), None)
}

pub fn tables() -> Arc<BattleTables> {
    Arc::new(TablesLoader::parse(TABLES).unwrap())
}

pub fn monsters() -> TableMonsterProvider {
    TableMonsterProvider::new(tables())
}

pub fn settings() -> Arc<SettingsRegistry> {
    Arc::new(SettingsRegistry::new(Arc::new(InMemorySettingsRepo::new())).unwrap())
}

pub fn offline() -> ArenaConfig {
    ArenaConfig {
        event_buffer_size: 256,
        pacing: false,
    }
}

pub fn arena() -> Arena {
    Arena::builder()
        .config(offline())
        .settings(settings())
        .stat_provider(roster())
        .monster_provider(monsters())
        .seed(7)
        .build()
        .unwrap()
}

/// Outcome sink that keeps every report, or rejects them all.
#[derive(Clone, Default)]
pub struct RecordingSink {
    pub reports: Arc<Mutex<Vec<BattleReport>>>,
    pub reject: bool,
}

#[async_trait]
impl OutcomeSink for RecordingSink {
    async fn record(&self, report: &BattleReport) -> Result<(), ExternalError> {
        if self.reject {
            return Err(ExternalError::Rejected {
                service: "rewards",
                reason: "ledger closed".into(),
            });
        }
        self.reports.lock().unwrap().push(report.clone());
        Ok(())
    }
}
