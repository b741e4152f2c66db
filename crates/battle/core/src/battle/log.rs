//! Bounded history of recent turns, kept for presentation replays.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::engine::TurnEvent;

/// Ring buffer of the last `capacity` turn events.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BattleLog {
    capacity: usize,
    entries: VecDeque<TurnEvent>,
}

impl BattleLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    /// Append an event, evicting the oldest one when full.
    pub fn push(&mut self, event: TurnEvent) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(event);
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &TurnEvent> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&TurnEvent> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn to_vec(&self) -> Vec<TurnEvent> {
        self.entries.iter().cloned().collect()
    }
}
