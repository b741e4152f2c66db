//! Injectable randomness for combat resolution.
//!
//! Every random decision the engine makes (elemental swing, simple-formula
//! swing, death-cheat roll, random target) goes through [`BattleRng`]. The
//! production implementation is [`SeededRng`]; tests script exact draws with
//! [`FixedRng`].
//!
//! # Determinism
//!
//! Given the same seed, [`SeededRng`] yields the same sequence, so a whole
//! battle can be replayed from its seed.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Source of randomness for one battle.
pub trait BattleRng: Send {
    /// Uniform float in `[low, high]`.
    fn uniform(&mut self, low: f64, high: f64) -> f64;

    /// Uniform integer in `[low, high]` inclusive.
    fn range_inclusive(&mut self, low: u32, high: u32) -> u32;

    /// Uniform index in `[0, len)`. `len` must be non-zero.
    fn index(&mut self, len: usize) -> usize;

    /// Returns true with probability `percent / 100`.
    ///
    /// Percentages at or below 0 never succeed, at or above 100 always do.
    fn chance(&mut self, percent: f64) -> bool {
        if percent <= 0.0 {
            return false;
        }
        if percent >= 100.0 {
            return true;
        }
        self.uniform(0.0, 100.0) < percent
    }
}

/// ChaCha8-backed RNG seeded once per battle.
#[derive(Clone, Debug)]
pub struct SeededRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl SeededRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Create an RNG seeded from OS entropy.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    /// The seed this RNG was created with.
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl BattleRng for SeededRng {
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        if low >= high {
            return low;
        }
        self.inner.gen_range(low..=high)
    }

    fn range_inclusive(&mut self, low: u32, high: u32) -> u32 {
        if low >= high {
            return low;
        }
        self.inner.gen_range(low..=high)
    }

    fn index(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        self.inner.gen_range(0..len)
    }
}

/// Scripted RNG for tests and replays.
///
/// Each draw consumes the next queued unit value `u ∈ [0, 1]` and maps it into
/// the requested range (`low + u × (high − low)`). When the queue runs dry the
/// `fallback` value is used for every further draw.
#[derive(Clone, Debug)]
pub struct FixedRng {
    queue: VecDeque<f64>,
    fallback: f64,
}

impl FixedRng {
    /// An RNG that always returns the given unit value.
    pub fn constant(unit: f64) -> Self {
        Self {
            queue: VecDeque::new(),
            fallback: unit.clamp(0.0, 1.0),
        }
    }

    /// An RNG that replays `units` in order, then falls back to `0.5`.
    pub fn sequence(units: impl IntoIterator<Item = f64>) -> Self {
        Self {
            queue: units.into_iter().map(|u| u.clamp(0.0, 1.0)).collect(),
            fallback: 0.5,
        }
    }

    fn next_unit(&mut self) -> f64 {
        self.queue.pop_front().unwrap_or(self.fallback)
    }
}

impl BattleRng for FixedRng {
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        let unit = self.next_unit();
        low + unit * (high - low)
    }

    fn range_inclusive(&mut self, low: u32, high: u32) -> u32 {
        if low >= high {
            return low;
        }
        let unit = self.next_unit();
        let span = f64::from(high - low);
        low + (unit * span).round() as u32
    }

    fn index(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        let unit = self.next_unit();
        ((unit * len as f64) as usize).min(len - 1)
    }
}
