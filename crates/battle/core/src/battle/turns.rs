//! Actor rotation and target selection.

use crate::battle_type::TargetPolicy;
use crate::engine::Slot;
use crate::rng::BattleRng;
use crate::team::Team;

/// Round-robin cursor over `(team, member)`.
///
/// Teams alternate every turn; inside a team a separate cursor walks the
/// members so each living member acts in turn order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct TurnCursor {
    team: usize,
    members: Vec<usize>,
}

impl TurnCursor {
    pub(crate) fn new(teams: usize) -> Self {
        Self {
            team: 0,
            members: vec![0; teams],
        }
    }

    /// Next living combatant to act, skipping dead members and defeated teams.
    pub(crate) fn next_actor(&mut self, teams: &[Team]) -> Option<Slot> {
        let count = teams.len();
        if count == 0 || self.members.len() != count {
            return None;
        }

        for _ in 0..count {
            let team_index = self.team;
            self.team = (self.team + 1) % count;

            let team = &teams[team_index];
            if team.defeated() {
                continue;
            }

            let len = team.len();
            for _ in 0..len {
                let member = self.members[team_index] % len;
                self.members[team_index] = (member + 1) % len;
                if team.members()[member].is_alive() {
                    return Some(Slot::new(team_index, member));
                }
            }
        }
        None
    }
}

/// Pick the target for `actor` under `policy`.
///
/// Returns `None` when no opponent is alive.
pub(crate) fn select_target(
    policy: TargetPolicy,
    actor: Slot,
    teams: &[Team],
    rng: &mut dyn BattleRng,
) -> Option<Slot> {
    match policy {
        TargetPolicy::FirstAliveOpponent => first_alive_opponent(actor.team, teams),
        TargetPolicy::RandomOpponent => random_opponent(actor.team, teams, rng),
        TargetPolicy::BossHitsRandomPlayer { boss_team } => {
            if actor.team == boss_team {
                random_opponent(actor.team, teams, rng)
            } else {
                teams
                    .get(boss_team)
                    .and_then(Team::first_alive)
                    .map(|index| Slot::new(boss_team, index))
                    .or_else(|| first_alive_opponent(actor.team, teams))
            }
        }
    }
}

/// First living member of the next non-defeated team after `own`.
fn first_alive_opponent(own: usize, teams: &[Team]) -> Option<Slot> {
    let count = teams.len();
    (1..count)
        .map(|offset| (own + offset) % count)
        .find_map(|team| teams[team].first_alive().map(|index| Slot::new(team, index)))
}

fn random_opponent(own: usize, teams: &[Team], rng: &mut dyn BattleRng) -> Option<Slot> {
    let candidates: Vec<Slot> = teams
        .iter()
        .enumerate()
        .filter(|(team, _)| *team != own)
        .flat_map(|(team, members)| {
            members
                .alive_indices()
                .into_iter()
                .map(move |index| Slot::new(team, index))
        })
        .collect();

    if candidates.is_empty() {
        return None;
    }
    Some(candidates[rng.index(candidates.len())])
}
