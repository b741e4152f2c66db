//! Ordered group of combatants fighting as one side.

use serde::{Deserialize, Serialize};

use crate::combatant::Combatant;
use crate::error::ConfigError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub name: String,
    /// Member order is turn priority.
    members: Vec<Combatant>,
}

impl Team {
    /// Create a team; a team must have at least one member.
    pub fn new(name: impl Into<String>, members: Vec<Combatant>) -> Result<Self, ConfigError> {
        let name = name.into();
        if members.is_empty() {
            return Err(ConfigError::EmptyTeam { team: name });
        }
        Ok(Self { name, members })
    }

    pub fn members(&self) -> &[Combatant] {
        &self.members
    }

    pub(crate) fn members_mut(&mut self) -> &mut [Combatant] {
        &mut self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Combatant> {
        self.members.get(index)
    }

    pub fn alive_combatants(&self) -> impl Iterator<Item = &Combatant> {
        self.members.iter().filter(|c| c.is_alive())
    }

    /// Indices of living members, in turn order.
    pub fn alive_indices(&self) -> Vec<usize> {
        self.members
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_alive())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn first_alive(&self) -> Option<usize> {
        self.members.iter().position(Combatant::is_alive)
    }

    pub fn defeated(&self) -> bool {
        !self.members.iter().any(Combatant::is_alive)
    }

    pub fn total_hp(&self) -> f64 {
        self.members.iter().map(Combatant::hp).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combatant::CombatantId;

    fn member(name: &str, hp: f64) -> Combatant {
        Combatant::new(CombatantId::Monster(name.into()), name, hp, 1.0, 0.0)
    }

    #[test]
    fn empty_team_is_rejected() {
        let err = Team::new("ghosts", vec![]).unwrap_err();
        assert_eq!(err, ConfigError::EmptyTeam { team: "ghosts".into() });
    }

    #[test]
    fn defeated_once_every_member_falls() {
        let mut team = Team::new("pair", vec![member("a", 10.0), member("b", 10.0)]).unwrap();
        assert!(!team.defeated());
        team.members_mut()[0].apply_damage(10.0);
        assert_eq!(team.alive_indices(), vec![1]);
        assert_eq!(team.first_alive(), Some(1));
        team.members_mut()[1].apply_damage(10.0);
        assert!(team.defeated());
        assert_eq!(team.alive_combatants().count(), 0);
    }
}
