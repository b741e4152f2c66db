//! End-to-end battles through the arena: registry, factory, runner, events.

mod common;

use std::collections::HashSet;
use std::sync::Arc;

use battle_core::{BattleOutcome, BattleSpec, EndReason, SettingKey, SettingsOverrides};
use battle_runtime::{
    Arena, Event, LifecycleEvent, ProviderKind, RuntimeError, SettingsScope, Topic,
};
use common::*;
use serde_json::json;

fn duel(a: &str, b: &str) -> BattleSpec {
    BattleSpec::Duel {
        challenger: id(a),
        opponent: id(b),
        stake: 100,
    }
}

#[tokio::test]
async fn duel_runs_to_a_decisive_report() {
    let arena = arena();
    let mut lifecycle = arena.subscribe(Topic::Lifecycle);
    let mut turns = arena.subscribe(Topic::Turn);

    let report = arena
        .fight("duel", duel("a", "b"), &SettingsOverrides::new())
        .await
        .unwrap();

    // 20 damage per hit kills b on a's fifth swing.
    assert_eq!(report.turns, 9);
    assert_eq!(
        report.outcome,
        BattleOutcome::Victory {
            winner: 0,
            loser: 1,
            reason: EndReason::Defeat,
        }
    );
    assert_eq!(report.teams[0].members[0].hp, 80.0);
    assert_eq!(report.recent_turns.len(), 5);
    assert_eq!(report.payload.stake(), Some(100));
    assert_eq!(arena.fights().active_count(), 0);

    let kinds: Vec<&'static str> = std::iter::from_fn(|| lifecycle.try_recv().ok())
        .map(|event| match event {
            Event::Lifecycle(LifecycleEvent::Created { .. }) => "created",
            Event::Lifecycle(LifecycleEvent::Started { .. }) => "started",
            Event::Lifecycle(LifecycleEvent::Finished { .. }) => "finished",
            _ => "other",
        })
        .collect();
    assert_eq!(kinds, ["created", "started", "finished"]);
    assert_eq!(std::iter::from_fn(|| turns.try_recv().ok()).count(), 9);
}

#[tokio::test]
async fn busy_participants_are_rejected_before_construction() {
    let arena = arena();
    assert!(arena.fights().try_enter(&id("a")));

    let err = arena
        .fight("duel", duel("b", "a"), &SettingsOverrides::new())
        .await
        .unwrap_err();
    assert!(matches!(err, RuntimeError::Concurrency { participant } if participant == id("a")));
    assert!(!arena.fights().is_busy(&id("b")));

    arena.fights().leave(&id("a"));
    assert!(arena.fight("duel", duel("b", "a"), &SettingsOverrides::new()).await.is_ok());
}

#[tokio::test]
async fn failed_construction_releases_participants() {
    let arena = arena();
    let mut lifecycle = arena.subscribe(Topic::Lifecycle);

    let err = arena
        .fight("duel", duel("a", "nobody"), &SettingsOverrides::new())
        .await
        .unwrap_err();
    assert!(matches!(err, RuntimeError::Config(_)));
    assert_eq!(arena.fights().active_count(), 0);
    assert!(matches!(
        lifecycle.try_recv().unwrap(),
        Event::Lifecycle(LifecycleEvent::Aborted { battle_id: None, .. })
    ));
}

#[tokio::test]
async fn stored_and_call_site_settings_shape_the_battle() {
    let arena = arena();
    arena
        .settings()
        .set(SettingsScope::Battle(battle_core::BattleType::Duel), SettingKey::MaxTurns, json!(1))
        .unwrap();

    let report = arena
        .fight("duel", duel("a", "b"), &SettingsOverrides::new())
        .await
        .unwrap();
    assert_eq!(report.turns, 1);
    assert_eq!(report.outcome, BattleOutcome::Tie { reason: EndReason::Timeout });

    let longer = SettingsOverrides::new().with(SettingKey::MaxTurns, 3);
    let report = arena.fight("duel", duel("a", "b"), &longer).await.unwrap();
    assert_eq!(report.turns, 3);
}

#[tokio::test]
async fn pve_player_death_ends_the_battle_with_the_pet_standing() {
    let arena = Arena::builder()
        .config(offline())
        .stat_provider(
            battle_runtime::RosterStatProvider::new().with(profile("weak", 5.0, 1.0), Some(pet())),
        )
        .monster_provider(monsters())
        .seed(1)
        .build()
        .unwrap();

    let report = arena
        .fight(
            "pve",
            BattleSpec::Pve {
                player: id("weak"),
                tier: 1,
            },
            &SettingsOverrides::new(),
        )
        .await
        .unwrap();

    assert_eq!(report.outcome.loser(), Some(0));
    assert_eq!(report.outcome.reason(), EndReason::Concession);
    let pet = &report.teams[0].members[1];
    assert!(pet.hp > 0.0);
}

#[tokio::test]
async fn outcome_sink_sees_every_finished_battle() {
    let sink = RecordingSink::default();
    let arena = Arena::builder()
        .config(offline())
        .stat_provider(roster())
        .monster_provider(monsters())
        .outcome_sink(sink.clone())
        .build()
        .unwrap();

    arena.fight("duel", duel("a", "b"), &SettingsOverrides::new()).await.unwrap();
    arena.fight("duel", duel("c", "d"), &SettingsOverrides::new()).await.unwrap();
    assert_eq!(sink.reports.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn sink_failure_is_reported_and_releases_participants() {
    let arena = Arena::builder()
        .config(offline())
        .stat_provider(roster())
        .monster_provider(monsters())
        .outcome_sink(RecordingSink {
            reject: true,
            ..RecordingSink::default()
        })
        .build()
        .unwrap();

    let err = arena
        .fight("duel", duel("a", "b"), &SettingsOverrides::new())
        .await
        .unwrap_err();
    assert!(matches!(err, RuntimeError::External(_)));
    assert_eq!(arena.fights().active_count(), 0);
}

#[tokio::test]
async fn spawned_fights_run_concurrently() {
    let arena = arena();
    let first = arena.spawn_fight("duel", duel("a", "b"), SettingsOverrides::new());
    let second = arena.spawn_fight("duel", duel("c", "d"), SettingsOverrides::new());

    let (first, second) = tokio::join!(first, second);
    assert!(first.unwrap().is_ok());
    assert!(second.unwrap().is_ok());
    assert_eq!(arena.fights().active_count(), 0);
}

#[tokio::test]
async fn shared_registry_spans_arenas() {
    let fights = Arc::new(battle_runtime::FightRegistry::new());
    let build = || {
        Arena::builder()
            .config(offline())
            .stat_provider(roster())
            .monster_provider(monsters())
            .fights(Arc::clone(&fights))
            .build()
            .unwrap()
    };
    let (left, right) = (build(), build());

    let _held = fights.enter_all([id("a")]).unwrap();
    assert!(left.fight("duel", duel("a", "b"), &SettingsOverrides::new()).await.is_err());
    assert!(right.fight("duel", duel("a", "c"), &SettingsOverrides::new()).await.is_err());
}

#[tokio::test]
async fn same_seed_same_battle() {
    let brawl = || BattleSpec::Brawl {
        left: vec![id("a"), id("b")],
        right: vec![id("c"), id("d")],
    };
    let first = arena().fight("brawl", brawl(), &SettingsOverrides::new()).await.unwrap();
    let second = arena().fight("brawl", brawl(), &SettingsOverrides::new()).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn seeded_pve_replays_the_monster_draw() {
    let pve = || BattleSpec::Pve {
        player: id("b"),
        tier: 2,
    };
    let mut foes = HashSet::new();
    let mut reports = Vec::new();
    for _ in 0..20 {
        let report = arena().fight("pve", pve(), &SettingsOverrides::new()).await.unwrap();
        foes.insert(report.teams[1].name.clone());
        reports.push(report);
    }

    assert_eq!(foes.len(), 1);
    assert!(reports.windows(2).all(|pair| pair[0] == pair[1]));
}

#[test]
fn builder_requires_providers() {
    let err = Arena::builder().stat_provider(roster()).build().err().unwrap();
    assert!(matches!(err, RuntimeError::MissingProvider { kind: ProviderKind::Monster }));

    let err = Arena::builder().monster_provider(monsters()).build().err().unwrap();
    assert!(matches!(err, RuntimeError::MissingProvider { kind: ProviderKind::Stat }));
}
