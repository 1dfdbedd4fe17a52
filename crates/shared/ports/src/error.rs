use odyssey_core::{SessionId, StudentId};
use thiserror::Error;

/// Errors raised by session store and leaderboard adapters
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Session not found: {0}")]
    SessionNotFound(SessionId),

    #[error("No market state for session {session_id} round {round} owner {owner_id}")]
    MarketStateNotFound {
        session_id: SessionId,
        round: u32,
        owner_id: String,
    },

    #[error("No player state for student {student_id} in session {session_id}")]
    PlayerStateNotFound {
        session_id: SessionId,
        student_id: StudentId,
    },

    #[error("Version conflict: expected {expected}, found {actual}")]
    VersionConflict { expected: u64, actual: u64 },

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Returns true if the error means the record simply does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::SessionNotFound(_)
                | StoreError::MarketStateNotFound { .. }
                | StoreError::PlayerStateNotFound { .. }
        )
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
