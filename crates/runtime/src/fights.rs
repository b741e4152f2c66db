//! Process-wide guard keeping every participant in at most one battle.
//!
//! Entry is a single mutex-guarded check-and-insert, so two tasks racing for
//! the same participant can never both win. Callers normally go through
//! [`FightRegistry::enter_all`], whose [`FightGuard`] releases its entries on
//! drop: a battle that errors or panics mid-way never locks its participants
//! out.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use battle_core::ParticipantId;

use crate::api::{Result, RuntimeError};

/// Proof of one registry entry. Only the holder of the matching token can
/// release an entry through a guard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FightToken(u64);

#[derive(Debug, Default)]
pub struct FightRegistry {
    active: Mutex<HashMap<ParticipantId, FightToken>>,
    next_token: AtomicU64,
}

impl FightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ParticipantId, FightToken>> {
        // Inserts and removes are single map operations, a poisoned map is
        // still consistent.
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn issue(&self) -> FightToken {
        FightToken(self.next_token.fetch_add(1, Ordering::Relaxed))
    }

    /// Mark `id` busy. Returns false if it already is.
    pub fn try_enter(&self, id: &ParticipantId) -> bool {
        let mut active = self.lock();
        if active.contains_key(id) {
            tracing::warn!(target: "runtime::fights", participant = %id, "participant already in a fight");
            return false;
        }
        active.insert(id.clone(), self.issue());
        tracing::debug!(target: "runtime::fights", participant = %id, "entered fight");
        true
    }

    /// Release `id`. Idempotent; returns true if an entry was removed.
    pub fn leave(&self, id: &ParticipantId) -> bool {
        let removed = self.lock().remove(id).is_some();
        if removed {
            tracing::debug!(target: "runtime::fights", participant = %id, "left fight");
        }
        removed
    }

    pub fn is_busy(&self, id: &ParticipantId) -> bool {
        self.lock().contains_key(id)
    }

    /// Number of participants currently in a fight.
    pub fn active_count(&self) -> usize {
        self.lock().len()
    }

    /// Enter every participant or none of them.
    ///
    /// Duplicate ids are entered once. On conflict nothing is registered and
    /// the first busy participant is reported.
    pub fn enter_all(
        self: &Arc<Self>,
        ids: impl IntoIterator<Item = ParticipantId>,
    ) -> Result<FightGuard> {
        let mut ids: Vec<ParticipantId> = ids.into_iter().collect();
        ids.sort();
        ids.dedup();

        let mut active = self.lock();
        if let Some(busy) = ids.iter().find(|id| active.contains_key(*id)) {
            tracing::warn!(
                target: "runtime::fights",
                participant = %busy,
                "rejected fight: participant already in a fight"
            );
            return Err(RuntimeError::Concurrency {
                participant: busy.clone(),
            });
        }

        let held: Vec<(ParticipantId, FightToken)> = ids
            .into_iter()
            .map(|id| {
                let token = self.issue();
                active.insert(id.clone(), token);
                (id, token)
            })
            .collect();
        drop(active);

        tracing::debug!(target: "runtime::fights", count = held.len(), "entered fight");
        Ok(FightGuard {
            registry: Arc::clone(self),
            held,
        })
    }

    /// Remove `id` only if it is still held under `token`.
    fn release(&self, id: &ParticipantId, token: FightToken) -> bool {
        let mut active = self.lock();
        if active.get(id) == Some(&token) {
            active.remove(id);
            true
        } else {
            false
        }
    }
}

/// Registry entries held for one battle; released on drop.
#[must_use = "dropping the guard releases the participants immediately"]
#[derive(Debug)]
pub struct FightGuard {
    registry: Arc<FightRegistry>,
    held: Vec<(ParticipantId, FightToken)>,
}

impl FightGuard {
    pub fn participants(&self) -> impl Iterator<Item = &ParticipantId> {
        self.held.iter().map(|(id, _)| id)
    }
}

impl Drop for FightGuard {
    fn drop(&mut self) {
        for (id, token) in self.held.drain(..) {
            if self.registry.release(&id, token) {
                tracing::debug!(target: "runtime::fights", participant = %id, "released fight");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> ParticipantId {
        ParticipantId::from(s)
    }

    #[test]
    fn try_enter_is_exclusive_until_leave() {
        let registry = FightRegistry::new();
        assert!(registry.try_enter(&id("p1")));
        assert!(!registry.try_enter(&id("p1")));
        assert!(registry.leave(&id("p1")));
        assert!(!registry.leave(&id("p1")));
        assert!(registry.try_enter(&id("p1")));
    }

    #[test]
    fn enter_all_is_all_or_nothing() {
        let registry = Arc::new(FightRegistry::new());
        assert!(registry.try_enter(&id("b")));

        let err = registry.enter_all([id("a"), id("b"), id("c")]).unwrap_err();
        assert!(matches!(err, RuntimeError::Concurrency { participant } if participant == id("b")));
        assert!(!registry.is_busy(&id("a")));
        assert!(!registry.is_busy(&id("c")));
    }

    #[test]
    fn guard_releases_on_drop() {
        let registry = Arc::new(FightRegistry::new());
        {
            let guard = registry.enter_all([id("a"), id("b"), id("a")]).unwrap();
            assert_eq!(guard.participants().count(), 2);
            assert_eq!(registry.active_count(), 2);
        }
        assert_eq!(registry.active_count(), 0);
    }

    #[test]
    fn guard_does_not_release_foreign_entries() {
        let registry = Arc::new(FightRegistry::new());
        let guard = registry.enter_all([id("a")]).unwrap();

        // Someone force-releases and a new fight grabs the slot.
        registry.leave(&id("a"));
        assert!(registry.try_enter(&id("a")));

        drop(guard);
        assert!(registry.is_busy(&id("a")));
    }

    #[test]
    fn guard_releases_when_the_task_panics() {
        let registry = Arc::new(FightRegistry::new());
        let inner = Arc::clone(&registry);
        let result = std::thread::spawn(move || {
            let _guard = inner.enter_all([id("p1")]).unwrap();
            panic!("battle blew up");
        })
        .join();

        assert!(result.is_err());
        assert!(!registry.is_busy(&id("p1")));
    }
}
