//! Battle state machine.
//!
//! A [`Battle`] owns its teams, turn counter and resolved config snapshot and
//! moves through three states:
//!
//! ```text
//! NotStarted --start()--> InProgress --process_turn()*--> InProgress --end()--> Over
//! ```
//!
//! Transitions never go backwards. `process_turn` is a silent no-op outside
//! `InProgress`; `start` and `end` report misuse through [`BattleStateError`]
//! without touching state.

mod log;
mod outcome;
mod turns;

pub use log::BattleLog;
pub use outcome::{BattleOutcome, BattleReport, CombatantSummary, EndReason, TeamSummary};

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::battle_type::{BattlePayload, BattleType, TimeoutRule};
use crate::combatant::Combatant;
use crate::config::BattleConfig;
use crate::engine::{CombatEngine, Slot, TurnEvent};
use crate::error::{BattleStateError, ConfigError};
use crate::modifiers::{ModifierResolver, StandardResolver};
use crate::profile::ParticipantId;
use crate::rng::{BattleRng, SeededRng};
use crate::team::Team;

use turns::TurnCursor;

/// Process-unique battle identifier, allocated by the factory.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BattleId(pub u64);

impl fmt::Display for BattleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "battle#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattleState {
    NotStarted,
    InProgress,
    Over,
}

/// One battle session.
pub struct Battle {
    id: BattleId,
    config: BattleConfig,
    payload: BattlePayload,
    teams: Vec<Team>,
    state: BattleState,
    turn: u32,
    cursor: TurnCursor,
    conceded: Option<usize>,
    outcome: Option<BattleOutcome>,
    log: BattleLog,
    rng: Box<dyn BattleRng>,
    resolver: Arc<dyn ModifierResolver>,
}

impl Battle {
    /// Assemble a battle in `NotStarted` state.
    ///
    /// At least two teams are required. The battle draws from an
    /// entropy-seeded RNG and the standard modifier tables unless replaced
    /// with [`with_rng`](Self::with_rng) / [`with_resolver`](Self::with_resolver).
    pub fn new(
        id: BattleId,
        config: BattleConfig,
        payload: BattlePayload,
        teams: Vec<Team>,
    ) -> Result<Self, ConfigError> {
        if teams.len() < 2 {
            return Err(ConfigError::ParticipantCount {
                battle_type: config.battle_type,
                expected: "at least two teams of",
                actual: teams.len(),
            });
        }

        Ok(Self {
            id,
            cursor: TurnCursor::new(teams.len()),
            log: BattleLog::new(config.battle_log_size),
            config,
            payload,
            teams,
            state: BattleState::NotStarted,
            turn: 0,
            conceded: None,
            outcome: None,
            rng: Box::new(SeededRng::from_entropy()),
            resolver: Arc::new(StandardResolver),
        })
    }

    #[must_use]
    pub fn with_rng(mut self, rng: Box<dyn BattleRng>) -> Self {
        self.rng = rng;
        self
    }

    #[must_use]
    pub fn with_resolver(mut self, resolver: Arc<dyn ModifierResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn id(&self) -> BattleId {
        self.id
    }

    pub fn battle_type(&self) -> BattleType {
        self.config.battle_type
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    pub fn payload(&self) -> &BattlePayload {
        &self.payload
    }

    pub fn state(&self) -> BattleState {
        self.state
    }

    /// Number of turns resolved so far.
    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn team(&self, index: usize) -> Option<&Team> {
        self.teams.get(index)
    }

    pub fn combatant(&self, slot: Slot) -> Option<&Combatant> {
        self.teams.get(slot.team).and_then(|t| t.get(slot.index))
    }

    pub fn log(&self) -> &BattleLog {
        &self.log
    }

    /// The cached outcome, once `end()` has succeeded.
    pub fn outcome(&self) -> Option<BattleOutcome> {
        self.outcome
    }

    /// Every participant represented by a player combatant, in team order.
    pub fn participants(&self) -> Vec<&ParticipantId> {
        self.teams
            .iter()
            .flat_map(Team::members)
            .filter(|c| !c.is_pet)
            .filter_map(|c| c.id.participant())
            .collect()
    }

    /// Index of the team holding the players. Team 0 in symmetric modes.
    pub fn player_team(&self) -> usize {
        self.battle_type().player_team().unwrap_or(0)
    }

    /// Whether any non-pet member of the player team is alive.
    pub fn player_alive(&self) -> bool {
        self.teams
            .get(self.player_team())
            .is_some_and(|t| t.alive_combatants().any(|c| !c.is_pet))
    }

    /// Whether any pet on the player team is alive.
    pub fn pet_alive(&self) -> bool {
        self.teams
            .get(self.player_team())
            .is_some_and(|t| t.alive_combatants().any(|c| c.is_pet))
    }

    /// Terminal condition, evaluated fresh on every call.
    pub fn is_over(&self) -> bool {
        match self.state {
            BattleState::NotStarted => false,
            BattleState::Over => true,
            BattleState::InProgress => {
                self.conceded.is_some()
                    || self.teams.iter().any(Team::defeated)
                    || self.turn >= self.config.max_turns
            }
        }
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    pub fn start(&mut self) -> Result<(), BattleStateError> {
        if self.state != BattleState::NotStarted {
            tracing::warn!(
                target: "battle::state",
                battle = %self.id,
                state = ?self.state,
                "start() called twice"
            );
            return Err(BattleStateError::AlreadyStarted);
        }

        self.state = BattleState::InProgress;
        tracing::info!(
            target: "battle::state",
            battle = %self.id,
            battle_type = %self.battle_type(),
            teams = self.teams.len(),
            max_turns = self.config.max_turns,
            "battle started"
        );
        Ok(())
    }

    /// Resolve one action.
    ///
    /// Returns `None` without mutating anything when the battle is not in
    /// progress or is already over.
    pub fn process_turn(&mut self) -> Option<TurnEvent> {
        if self.state != BattleState::InProgress || self.is_over() {
            return None;
        }

        let policy = self.battle_type().target_policy();
        let actor_slot = self.cursor.next_actor(&self.teams)?;
        let target_slot = turns::select_target(policy, actor_slot, &self.teams, self.rng.as_mut())?;

        self.turn += 1;
        let engine = CombatEngine::new(&self.config, self.resolver.as_ref());
        let (actor, target) = pair_mut(&mut self.teams, actor_slot, target_slot);
        let resolution = engine.resolve(actor, target, self.rng.as_mut());

        let event = TurnEvent {
            turn: self.turn,
            actor: actor.id.clone(),
            actor_slot,
            target: target.id.clone(),
            target_slot,
            element: resolution.element,
            damage: resolution.damage,
            target_hp: target.hp(),
            actor_hp: actor.hp(),
            effects: resolution.effects,
        };

        tracing::debug!(
            target: "battle::engine",
            battle = %self.id,
            battle_type = %self.config.battle_type,
            turn = event.turn,
            actor = %event.actor,
            target_id = %event.target,
            damage = event.damage,
            target_hp = event.target_hp,
            "turn resolved"
        );

        self.log.push(event.clone());
        Some(event)
    }

    /// Withdraw `team`. The battle is over from the next `is_over()` check and
    /// `team` is recorded as the loser.
    pub fn concede(&mut self, team: usize) -> Result<(), BattleStateError> {
        if team >= self.teams.len() {
            return Err(BattleStateError::UnknownTeam {
                team,
                teams: self.teams.len(),
            });
        }
        match self.state {
            BattleState::NotStarted => Err(BattleStateError::NotStarted),
            BattleState::Over => Err(BattleStateError::AlreadyOver),
            BattleState::InProgress => {
                if self.conceded.is_none() {
                    tracing::info!(target: "battle::state", battle = %self.id, team, "team conceded");
                    self.conceded = Some(team);
                }
                Ok(())
            }
        }
    }

    /// Transition to `Over` and compute the outcome.
    ///
    /// The first successful call fixes the outcome; later calls return the
    /// same value and mutate nothing.
    pub fn end(&mut self) -> Result<BattleOutcome, BattleStateError> {
        if let Some(outcome) = self.outcome {
            return Ok(outcome);
        }
        if self.state == BattleState::NotStarted {
            tracing::warn!(target: "battle::state", battle = %self.id, "end() before start()");
            return Err(BattleStateError::NotStarted);
        }
        if !self.is_over() {
            tracing::warn!(
                target: "battle::state",
                battle = %self.id,
                turn = self.turn,
                "end() before the battle is over"
            );
            return Err(BattleStateError::NotOver { turn: self.turn });
        }

        let outcome = self.decide();
        self.state = BattleState::Over;
        self.outcome = Some(outcome);

        tracing::info!(
            target: "battle::state",
            battle = %self.id,
            battle_type = %self.battle_type(),
            turns = self.turn,
            ?outcome,
            "battle finished"
        );
        Ok(outcome)
    }

    /// Summary for downstream consumers; `None` until `end()` succeeded.
    pub fn report(&self) -> Option<BattleReport> {
        let outcome = self.outcome?;
        Some(BattleReport {
            battle_id: self.id,
            battle_type: self.battle_type(),
            outcome,
            turns: self.turn,
            payload: self.payload.clone(),
            teams: self
                .teams
                .iter()
                .map(|team| TeamSummary {
                    name: team.name.clone(),
                    defeated: team.defeated(),
                    members: team
                        .members()
                        .iter()
                        .map(|c| CombatantSummary {
                            id: c.id.clone(),
                            name: c.name.clone(),
                            hp: c.hp(),
                            max_hp: c.max_hp(),
                            cheated_death: c.has_cheated_death(),
                        })
                        .collect(),
                })
                .collect(),
            recent_turns: self.log.to_vec(),
        })
    }

    fn decide(&self) -> BattleOutcome {
        let standing: Vec<usize> = (0..self.teams.len())
            .filter(|&i| Some(i) != self.conceded && !self.teams[i].defeated())
            .collect();

        if let Some(loser) = self.conceded {
            return match standing.first() {
                Some(&winner) => BattleOutcome::Victory {
                    winner,
                    loser,
                    reason: EndReason::Concession,
                },
                None => BattleOutcome::Tie {
                    reason: EndReason::Concession,
                },
            };
        }

        if standing.len() < self.teams.len() {
            // At least one team fell.
            let loser = (0..self.teams.len()).find(|i| !standing.contains(i));
            return match (standing.as_slice(), loser) {
                ([winner], Some(loser)) => BattleOutcome::Victory {
                    winner: *winner,
                    loser,
                    reason: EndReason::Defeat,
                },
                _ => BattleOutcome::Tie {
                    reason: EndReason::Defeat,
                },
            };
        }

        match self.battle_type().timeout_rule() {
            TimeoutRule::Tie => BattleOutcome::Tie {
                reason: EndReason::Timeout,
            },
            TimeoutRule::Defeat { loser } => match standing.iter().find(|&&i| i != loser) {
                Some(&winner) => BattleOutcome::Victory {
                    winner,
                    loser,
                    reason: EndReason::Timeout,
                },
                None => BattleOutcome::Tie {
                    reason: EndReason::Timeout,
                },
            },
        }
    }
}

impl fmt::Debug for Battle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Battle")
            .field("id", &self.id)
            .field("battle_type", &self.config.battle_type)
            .field("state", &self.state)
            .field("turn", &self.turn)
            .field("teams", &self.teams)
            .field("outcome", &self.outcome)
            .finish_non_exhaustive()
    }
}

/// Mutable access to two combatants on different teams.
fn pair_mut(teams: &mut [Team], a: Slot, b: Slot) -> (&mut Combatant, &mut Combatant) {
    debug_assert_ne!(a.team, b.team, "actor and target share a team");
    if a.team < b.team {
        let (left, right) = teams.split_at_mut(b.team);
        (
            &mut left[a.team].members_mut()[a.index],
            &mut right[0].members_mut()[b.index],
        )
    } else {
        let (left, right) = teams.split_at_mut(a.team);
        (
            &mut right[0].members_mut()[a.index],
            &mut left[b.team].members_mut()[b.index],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combatant::CombatantId;
    use crate::config::SettingKey;
    use crate::rng::FixedRng;
    use serde_json::json;

    fn member(name: &str, hp: f64, damage: f64) -> Combatant {
        Combatant::new(CombatantId::Player(name.into()), name, hp, damage, 0.0)
    }

    fn config(battle_type: BattleType, max_turns: Option<u64>) -> BattleConfig {
        BattleConfig::resolve(battle_type, |key| match key {
            SettingKey::MaxTurns => max_turns.map(|t| json!(t)),
            _ => None,
        })
        .unwrap()
    }

    fn duel(max_turns: Option<u64>) -> Battle {
        let teams = vec![
            Team::new("left", vec![member("a", 100.0, 30.0)]).unwrap(),
            Team::new("right", vec![member("b", 100.0, 10.0)]).unwrap(),
        ];
        Battle::new(
            BattleId(1),
            config(BattleType::Duel, max_turns),
            BattlePayload::Duel { stake: 0 },
            teams,
        )
        .unwrap()
        .with_rng(Box::new(FixedRng::constant(0.5)))
    }

    fn run(battle: &mut Battle) -> Vec<TurnEvent> {
        let mut events = Vec::new();
        while !battle.is_over() {
            match battle.process_turn() {
                Some(event) => events.push(event),
                None => break,
            }
        }
        events
    }

    #[test]
    fn requires_two_teams() {
        let teams = vec![Team::new("solo", vec![member("a", 10.0, 1.0)]).unwrap()];
        let err = Battle::new(
            BattleId(0),
            config(BattleType::Duel, None),
            BattlePayload::Duel { stake: 0 },
            teams,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::ParticipantCount { actual: 1, .. }));
    }

    #[test]
    fn start_is_one_shot() {
        let mut battle = duel(None);
        assert_eq!(battle.start(), Ok(()));
        assert_eq!(battle.start(), Err(BattleStateError::AlreadyStarted));
        assert_eq!(battle.state(), BattleState::InProgress);
    }

    #[test]
    fn process_turn_is_a_no_op_before_start() {
        let mut battle = duel(None);
        assert!(battle.process_turn().is_none());
        assert_eq!(battle.turn(), 0);
        assert!(!battle.is_over());
    }

    #[test]
    fn end_requires_a_finished_battle() {
        let mut battle = duel(None);
        assert_eq!(battle.end(), Err(BattleStateError::NotStarted));
        battle.start().unwrap();
        battle.process_turn();
        assert_eq!(battle.end(), Err(BattleStateError::NotOver { turn: 1 }));
        assert_eq!(battle.state(), BattleState::InProgress);
    }

    #[test]
    fn duel_runs_to_defeat() {
        let mut battle = duel(None);
        battle.start().unwrap();
        let events = run(&mut battle);

        assert_eq!(events.len(), 7);
        assert!(events.last().is_some_and(TurnEvent::killed_target));
        assert_eq!(events[0].actor_slot, Slot::new(0, 0));
        assert_eq!(events[1].actor_slot, Slot::new(1, 0));

        let outcome = battle.end().unwrap();
        assert_eq!(
            outcome,
            BattleOutcome::Victory {
                winner: 0,
                loser: 1,
                reason: EndReason::Defeat
            }
        );
        assert_eq!(battle.state(), BattleState::Over);
        assert!(battle.process_turn().is_none());
    }

    #[test]
    fn end_twice_changes_nothing() {
        let mut battle = duel(None);
        battle.start().unwrap();
        run(&mut battle);
        let first = battle.end().unwrap();
        let teams = battle.teams().to_vec();
        let turn = battle.turn();

        let second = battle.end().unwrap();
        assert_eq!(first, second);
        assert_eq!(battle.teams(), teams.as_slice());
        assert_eq!(battle.turn(), turn);
    }

    #[test]
    fn duel_timeout_is_a_tie() {
        let mut battle = duel(Some(2));
        battle.start().unwrap();
        assert_eq!(run(&mut battle).len(), 2);
        assert_eq!(
            battle.end().unwrap(),
            BattleOutcome::Tie {
                reason: EndReason::Timeout
            }
        );
    }

    #[test]
    fn pve_timeout_defeats_the_player() {
        let teams = vec![
            Team::new("player", vec![member("p", 100.0, 1.0)]).unwrap(),
            Team::new(
                "monster",
                vec![Combatant::new(CombatantId::Monster("Slime".into()), "Slime", 100.0, 1.0, 0.0)],
            )
            .unwrap(),
        ];
        let mut battle = Battle::new(
            BattleId(2),
            config(BattleType::Pve, Some(4)),
            BattlePayload::Pve { tier: 1 },
            teams,
        )
        .unwrap()
        .with_rng(Box::new(FixedRng::constant(0.5)));

        battle.start().unwrap();
        run(&mut battle);
        assert_eq!(
            battle.end().unwrap(),
            BattleOutcome::Victory {
                winner: 1,
                loser: 0,
                reason: EndReason::Timeout
            }
        );
    }

    #[test]
    fn concession_ends_the_battle() {
        let mut battle = duel(None);
        assert_eq!(battle.concede(0), Err(BattleStateError::NotStarted));
        battle.start().unwrap();
        assert_eq!(
            battle.concede(5),
            Err(BattleStateError::UnknownTeam { team: 5, teams: 2 })
        );
        battle.concede(0).unwrap();
        assert!(battle.is_over());
        assert_eq!(battle.end().unwrap().loser(), Some(0));
        assert_eq!(battle.concede(1), Err(BattleStateError::AlreadyOver));
    }

    #[test]
    fn player_and_pet_queries_look_at_the_player_team() {
        let pet = Combatant::new(CombatantId::Pet("p".into()), "Rex", 10.0, 1.0, 0.0).as_pet();
        let mut player = member("p", 10.0, 1.0);
        player.apply_damage(10.0);
        let teams = vec![
            Team::new("player", vec![player, pet]).unwrap(),
            Team::new(
                "monster",
                vec![Combatant::new(CombatantId::Monster("Imp".into()), "Imp", 10.0, 1.0, 0.0)],
            )
            .unwrap(),
        ];
        let battle = Battle::new(
            BattleId(3),
            config(BattleType::Pve, None),
            BattlePayload::Pve { tier: 1 },
            teams,
        )
        .unwrap();

        assert!(!battle.player_alive());
        assert!(battle.pet_alive());
        assert_eq!(battle.participants(), vec![&ParticipantId::from("p")]);
    }

    #[test]
    fn log_and_report_follow_the_battle() {
        let mut battle = duel(None);
        battle.start().unwrap();
        assert!(battle.report().is_none());
        run(&mut battle);
        battle.end().unwrap();

        assert_eq!(battle.log().len(), 5);
        let report = battle.report().unwrap();
        assert_eq!(report.turns, 7);
        assert_eq!(report.recent_turns.first().map(|e| e.turn), Some(3));
        assert_eq!(report.winning_team().map(|t| t.name.as_str()), Some("left"));
        assert!(report.teams[1].defeated);
    }
}
