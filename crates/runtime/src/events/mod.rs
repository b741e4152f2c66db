//! Event bus for presentation and monitoring.
//!
//! Battles publish every resolved turn on [`Topic::Turn`] and their
//! lifecycle (created, started, finished, aborted) on [`Topic::Lifecycle`].
//! Publishing is best-effort: a topic without subscribers drops the event.
mod bus;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use types::{BattleTurn, LifecycleEvent};
