//! Display pacing between turns.
//!
//! Simulation never waits on its own; the runner asks a [`Pacer`] to suspend
//! for the configured `turn_delay_ms` so presentation can keep up.

use std::time::Duration;

use async_trait::async_trait;

#[async_trait]
pub trait Pacer: Send + Sync {
    async fn pace(&self, delay: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioPacer;

#[async_trait]
impl Pacer for TokioPacer {
    async fn pace(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}

/// Never sleeps; only yields so other tasks get a turn. Used by tests and
/// offline simulation.
#[derive(Clone, Copy, Debug, Default)]
pub struct InstantPacer;

#[async_trait]
impl Pacer for InstantPacer {
    async fn pace(&self, _delay: Duration) {
        tokio::task::yield_now().await;
    }
}
