//! Offline battle simulator.
//!
//! Loads the content directory, seeds the settings store and runs one sample
//! battle per requested type, printing each report as JSON.
//!
//! ```bash
//! # every battle type
//! cargo run -p battle-sim
//!
//! # only a duel and a dragon raid, reproducibly
//! BATTLE_SEED=42 cargo run -p battle-sim -- duel dragon
//! ```

mod config;

use std::sync::Arc;

use anyhow::{Context, Result};
use battle_content::ContentFactory;
use battle_core::{BattleSpec, BattleType, ParticipantId, SettingsOverrides};
use battle_runtime::{
    Arena, ArenaConfig, FileSettingsRepository, RosterStatProvider, SettingsRegistry,
    TableMonsterProvider,
};
use config::SimConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let config = SimConfig::from_env();
    tracing::info!(data_dir = %config.data_dir.display(), "Starting battle simulator");

    let arena = build_arena(&config)?;

    let requested: Vec<String> = std::env::args().skip(1).collect();
    let types = if requested.is_empty() {
        ALL_TYPES.to_vec()
    } else {
        requested
            .iter()
            .map(|tag| BattleType::parse(tag))
            .collect::<Result<Vec<_>, _>>()?
    };

    for battle_type in types {
        let report = arena
            .fight(battle_type.as_ref(), sample_spec(battle_type), &SettingsOverrides::new())
            .await
            .with_context(|| format!("{battle_type} battle failed"))?;
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}

const ALL_TYPES: [BattleType; 8] = [
    BattleType::Duel,
    BattleType::Pve,
    BattleType::Raid,
    BattleType::Tower,
    BattleType::Team,
    BattleType::Brawl,
    BattleType::Dragon,
    BattleType::CoopTower,
];

fn build_arena(config: &SimConfig) -> Result<Arena> {
    let content = ContentFactory::new(&config.data_dir);
    let tables = content.load_tables()?;
    let roster = content.load_roster()?;
    let seed = content.load_settings()?;

    let store = FileSettingsRepository::new(&config.settings_file)?;
    let settings = Arc::new(SettingsRegistry::new(Arc::new(store))?);
    let written = settings.seed(&seed)?;
    tracing::debug!(written, file = %config.settings_file.display(), "settings store ready");

    let mut builder = Arena::builder()
        .config(ArenaConfig {
            event_buffer_size: config.event_buffer_size,
            pacing: config.pacing,
        })
        .settings(settings)
        .stat_provider(RosterStatProvider::from_roster(roster))
        .monster_provider(TableMonsterProvider::new(Arc::new(tables)));
    if let Some(seed) = config.seed {
        builder = builder.seed(seed);
    }
    Ok(builder.build()?)
}

/// A battle between the bundled sample participants.
fn sample_spec(battle_type: BattleType) -> BattleSpec {
    let id = |name: &str| ParticipantId::from(name);
    match battle_type {
        BattleType::Duel => BattleSpec::Duel {
            challenger: id("ayla"),
            opponent: id("borin"),
            stake: 100,
        },
        BattleType::Pve => BattleSpec::Pve {
            player: id("ayla"),
            tier: 2,
        },
        BattleType::Raid => BattleSpec::Raid {
            attackers: vec![id("ayla"), id("cass")],
            defenders: vec![id("borin"), id("dov")],
            stake: 500,
        },
        BattleType::Tower => BattleSpec::Tower {
            player: id("dov"),
            floor: 12,
        },
        BattleType::Team => BattleSpec::Team {
            left: vec![id("ayla"), id("dov")],
            right: vec![id("borin"), id("cass")],
            stake: 50,
        },
        BattleType::Brawl => BattleSpec::Brawl {
            left: vec![id("cass")],
            right: vec![id("borin")],
        },
        BattleType::Dragon => BattleSpec::Dragon {
            players: vec![id("ayla"), id("borin"), id("cass"), id("dov")],
            level: 5,
        },
        BattleType::CoopTower => BattleSpec::CoopTower {
            players: [id("borin"), id("cass")],
            floor: 10,
        },
    }
}
