//! Drives a built battle to completion.
//!
//! The runner owns the only loop that calls into the state machine:
//!
//! ```text
//! start → while !is_over { process_turn → publish → pet rule → pace } → end → report → sink
//! ```
//!
//! It never touches the fight registry; [`crate::Arena`] holds the guard
//! around the whole run.

use std::sync::Arc;
use std::time::Duration;

use battle_core::{Battle, BattleReport, BattleStateError};

use crate::api::{OutcomeSink, Result};
use crate::events::{BattleTurn, Event, EventBus, LifecycleEvent};
use crate::pacer::Pacer;

pub struct BattleRunner {
    pacer: Arc<dyn Pacer>,
    events: EventBus,
    sink: Option<Arc<dyn OutcomeSink>>,
}

impl BattleRunner {
    pub fn new(pacer: Arc<dyn Pacer>, events: EventBus) -> Self {
        Self {
            pacer,
            events,
            sink: None,
        }
    }

    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn OutcomeSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Run `battle` from `NotStarted` to `Over` and hand the report to the
    /// outcome sink.
    ///
    /// A sink failure is returned after the battle has ended; the outcome
    /// stays fixed on `battle`.
    pub async fn run(&self, battle: &mut Battle) -> Result<BattleReport> {
        battle.start()?;
        self.events.publish(Event::Lifecycle(LifecycleEvent::Started {
            battle_id: battle.id(),
        }));

        let delay = Duration::from_millis(battle.config().turn_delay_ms);
        while !battle.is_over() {
            let Some(event) = battle.process_turn() else {
                break;
            };
            self.events.publish(Event::Turn(BattleTurn {
                battle_id: battle.id(),
                event,
            }));

            if should_stop_for_pet(battle) {
                let team = battle.player_team();
                tracing::debug!(
                    target: "runtime::runner",
                    battle = %battle.id(),
                    "player down with only a pet left, ending battle"
                );
                battle.concede(team)?;
                break;
            }

            if !delay.is_zero() && !battle.is_over() {
                self.pacer.pace(delay).await;
            }
        }

        battle.end()?;
        let report = battle.report().ok_or(BattleStateError::NotOver {
            turn: battle.turn(),
        })?;

        tracing::info!(
            target: "runtime::runner",
            battle = %report.battle_id,
            battle_type = %report.battle_type,
            turns = report.turns,
            outcome = ?report.outcome,
            "battle run complete"
        );
        self.events.publish(Event::Lifecycle(LifecycleEvent::Finished {
            report: report.clone(),
        }));

        if let Some(sink) = &self.sink
            && let Err(err) = sink.record(&report).await
        {
            tracing::error!(
                target: "runtime::runner",
                battle = %report.battle_id,
                error = %err,
                "outcome sink rejected report"
            );
            return Err(err.into());
        }

        Ok(report)
    }
}

/// A battle whose player fell while only their pet still stands ends unless
/// `pets_continue_battle` is on.
fn should_stop_for_pet(battle: &Battle) -> bool {
    !battle.config().pets_continue_battle && !battle.player_alive() && battle.pet_alive()
}
