//! Runtime providers backed by static content.
//!
//! These implementations serve the `api` provider traits from data loaded
//! once at startup by `battle-content`. The data is immutable at runtime.
mod monsters;
mod roster;

pub use monsters::TableMonsterProvider;
pub use roster::RosterStatProvider;
