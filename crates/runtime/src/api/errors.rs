//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from battle construction, the state machine, repositories
//! and external collaborators so callers can bubble them up with consistent
//! context.
use std::fmt;

use battle_core::{BattleError, BattleStateError, ConfigError, ErrorSeverity, ParticipantId};
use thiserror::Error;

pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The battle could not be configured; raised before it exists.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The state machine was driven out of order.
    #[error(transparent)]
    State(#[from] BattleStateError),

    /// An external collaborator failed. Never retried here.
    #[error(transparent)]
    External(#[from] ExternalError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("participant '{participant}' is already in a fight")]
    Concurrency { participant: ParticipantId },

    #[error("arena requires a {kind} provider to be configured before building")]
    MissingProvider { kind: ProviderKind },
}

impl BattleError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Config(e) => e.severity(),
            Self::State(e) => e.severity(),
            Self::External(e) => e.severity(),
            Self::Repository(e) => e.severity(),
            Self::Concurrency { .. } => ErrorSeverity::Validation,
            Self::MissingProvider { .. } => ErrorSeverity::Fatal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Config(e) => e.error_code(),
            Self::State(e) => e.error_code(),
            Self::External(e) => e.error_code(),
            Self::Repository(e) => e.error_code(),
            Self::Concurrency { .. } => "RUNTIME_CONCURRENCY",
            Self::MissingProvider { .. } => "RUNTIME_MISSING_PROVIDER",
        }
    }
}

/// Failure of a collaborator outside the battle core (stat service, monster
/// data, reward sink).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExternalError {
    #[error("{service} is unavailable: {reason}")]
    Unavailable { service: &'static str, reason: String },

    #[error("{service} timed out")]
    Timeout { service: &'static str },

    #[error("{service} rejected the request: {reason}")]
    Rejected { service: &'static str, reason: String },
}

impl ExternalError {
    pub fn unavailable(service: &'static str, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            service,
            reason: reason.into(),
        }
    }
}

impl BattleError for ExternalError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Unavailable { .. } | Self::Timeout { .. } => ErrorSeverity::Recoverable,
            Self::Rejected { .. } => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Unavailable { .. } => "EXTERNAL_UNAVAILABLE",
            Self::Timeout { .. } => "EXTERNAL_TIMEOUT",
            Self::Rejected { .. } => "EXTERNAL_REJECTED",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ProviderKind {
    Stat,
    Monster,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ProviderKind::Stat => "stat",
            ProviderKind::Monster => "monster",
        };
        write!(f, "{}", label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_follows_the_wrapped_error() {
        let transient = RuntimeError::from(ExternalError::Timeout { service: "stats" });
        assert!(transient.severity().is_recoverable());
        assert_eq!(transient.error_code(), "EXTERNAL_TIMEOUT");

        let misuse = RuntimeError::from(BattleStateError::AlreadyStarted);
        assert!(misuse.severity().is_internal());
        assert_eq!(misuse.error_code(), "STATE_ALREADY_STARTED");
    }
}
