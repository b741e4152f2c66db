//! Error types raised by repository implementations.

use battle_core::{BattleError, ErrorSeverity};
use thiserror::Error;

/// Errors surfaced by repository implementations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("settings repository lock was poisoned")]
    LockPoisoned,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(String),

    #[error("corrupted data: {0}")]
    CorruptedData(String),

    #[error("unsupported settings file version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
}

impl BattleError for RepositoryError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Io(_) => ErrorSeverity::Recoverable,
            Self::LockPoisoned => ErrorSeverity::Fatal,
            Self::Json(_) | Self::CorruptedData(_) | Self::UnsupportedVersion { .. } => {
                ErrorSeverity::Internal
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::LockPoisoned => "REPO_LOCK_POISONED",
            Self::Io(_) => "REPO_IO",
            Self::Json(_) => "REPO_JSON",
            Self::CorruptedData(_) => "REPO_CORRUPTED",
            Self::UnsupportedVersion { .. } => "REPO_VERSION",
        }
    }
}

pub type Result<T> = std::result::Result<T, RepositoryError>;
