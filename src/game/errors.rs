use thiserror::Error;

use crate::game::types::Rank;
use crate::storage::StoreError;

/// Errors surfaced by the game engines.
///
/// Everything except `Store` is fully recovered at the request boundary and
/// reported to the caller as a structured failure; the message always names
/// the offending quantity where one exists.
#[derive(Debug, Error)]
pub enum GameError {
    /// Wrapper around persistence failures.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Malformed or missing input, rejected before any state is read.
    #[error("invalid request: {0}")]
    Validation(String),

    /// Referenced entity absent where absence is a caller error.
    #[error("not found: {0}")]
    NotFound(String),

    /// Role, ownership or participant mismatch.
    #[error("not allowed: {0}")]
    Unauthorized(String),

    /// Login rejected because the session capacity is exhausted.
    #[error("server full: {current} of {max} players online")]
    ServerFull { current: usize, max: usize },

    /// Duplicate name, illegal state transition, already-taken slot.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A debit would overdraw a balance.
    #[error("insufficient funds: need {required}, have {available}")]
    InsufficientFunds { required: u64, available: u64 },

    /// NPC content gated behind a rank the player has not reached.
    #[error("rank too low: requires {required}, current rank is {actual}")]
    RankTooLow { required: Rank, actual: Rank },
}

impl GameError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}
