//! Common error infrastructure for battle-core.
//!
//! Two families of errors live here:
//!
//! - [`ConfigError`]: a battle could not be assembled (unknown type, missing
//!   construction data, malformed setting). Raised before any [`Battle`]
//!   exists and never recoverable by retrying the same input.
//! - [`BattleStateError`]: a caller drove the state machine out of order
//!   (double `start()`, `end()` before the battle is over). These are
//!   programmer errors; the state machine rejects them without mutating.
//!
//! Both implement [`BattleError`] so the runtime can classify and log them
//! uniformly.
//!
//! [`Battle`]: crate::battle::Battle

use crate::battle_type::BattleType;
use crate::config::SettingKey;

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: the same call may succeed later (external service hiccup)
/// - **Validation**: invalid input, retrying without changes is pointless
/// - **Internal**: the caller violated a precondition; indicates a bug
/// - **Fatal**: the subsystem cannot continue
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorSeverity {
    Recoverable,
    Validation,
    Internal,
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates a bug in the caller.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all battle errors.
///
/// # Implementation Guidelines
///
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
/// - Keep `error_code` stable; it is used in logs and tests
pub trait BattleError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

// ============================================================================
// State machine preconditions
// ============================================================================

/// Out-of-order use of the battle state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BattleStateError {
    #[error("battle has already been started")]
    AlreadyStarted,

    #[error("battle has not been started")]
    NotStarted,

    #[error("battle is not over yet (turn {turn})")]
    NotOver { turn: u32 },

    #[error("battle is already over")]
    AlreadyOver,

    #[error("team index {team} is out of range ({teams} teams)")]
    UnknownTeam { team: usize, teams: usize },
}

impl BattleError for BattleStateError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Internal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::AlreadyStarted => "STATE_ALREADY_STARTED",
            Self::NotStarted => "STATE_NOT_STARTED",
            Self::NotOver { .. } => "STATE_NOT_OVER",
            Self::AlreadyOver => "STATE_ALREADY_OVER",
            Self::UnknownTeam { .. } => "STATE_UNKNOWN_TEAM",
        }
    }
}

// ============================================================================
// Construction / configuration
// ============================================================================

/// A battle could not be configured or assembled.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown battle type '{0}'")]
    UnknownBattleType(String),

    #[error("battle type {requested} does not match the {provided} participant spec")]
    MismatchedSpec {
        requested: BattleType,
        provided: BattleType,
    },

    #[error("no construction data for {subject} in a {battle_type} battle")]
    MissingConstructionData {
        battle_type: BattleType,
        subject: String,
    },

    #[error("team '{team}' has no members")]
    EmptyTeam { team: String },

    #[error("{battle_type} battle needs {expected} participants, got {actual}")]
    ParticipantCount {
        battle_type: BattleType,
        expected: &'static str,
        actual: usize,
    },

    #[error("participant '{0}' appears more than once")]
    DuplicateParticipant(String),

    #[error("setting '{key}' has an invalid value {value}: expected {expected}")]
    InvalidSetting {
        key: SettingKey,
        value: serde_json::Value,
        expected: &'static str,
    },
}

impl BattleError for ConfigError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::InvalidSetting { .. } => ErrorSeverity::Fatal,
            _ => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownBattleType(_) => "CONFIG_UNKNOWN_BATTLE_TYPE",
            Self::MismatchedSpec { .. } => "CONFIG_MISMATCHED_SPEC",
            Self::MissingConstructionData { .. } => "CONFIG_MISSING_CONSTRUCTION_DATA",
            Self::EmptyTeam { .. } => "CONFIG_EMPTY_TEAM",
            Self::ParticipantCount { .. } => "CONFIG_PARTICIPANT_COUNT",
            Self::DuplicateParticipant(_) => "CONFIG_DUPLICATE_PARTICIPANT",
            Self::InvalidSetting { .. } => "CONFIG_INVALID_SETTING",
        }
    }
}
