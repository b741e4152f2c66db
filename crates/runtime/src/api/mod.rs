//! Public runtime API surface.
//!
//! This module gathers the types exposed to consumers of the runtime crate so
//! other layers can stay focused on orchestration and infrastructure.

pub mod errors;
pub mod providers;

pub use errors::{ExternalError, ProviderKind, Result, RuntimeError};
pub use providers::{MonsterProvider, MonsterSpawn, OutcomeSink, StatProvider};
