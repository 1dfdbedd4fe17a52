use odyssey_core::{SessionId, SessionStatus, StudentId};
use odyssey_order_manager::TradeError;
use odyssey_ports::StoreError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("Cannot {action} a session that is {status:?}")]
    InvalidTransition {
        action: &'static str,
        status: SessionStatus,
    },

    #[error("Market for round {round} is not published yet")]
    SyncUnavailable { round: u32 },

    #[error("Session not found: {0}")]
    SessionNotFound(SessionId),

    #[error("Session was updated concurrently: expected version {expected}, found {actual}")]
    Conflict { expected: u64, actual: u64 },

    #[error("Student {0} has not joined the session")]
    NotParticipant(StudentId),

    #[error("Local market generation is only allowed while offline")]
    NotOffline,

    #[error("Trade rejected: {0}")]
    Trade(#[from] TradeError),

    #[error("Store error: {0}")]
    Store(StoreError),
}

pub type Result<T> = std::result::Result<T, SessionError>;

impl From<StoreError> for SessionError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::SessionNotFound(id) => SessionError::SessionNotFound(id),
            StoreError::PlayerStateNotFound { student_id, .. } => {
                SessionError::NotParticipant(student_id)
            }
            StoreError::VersionConflict { expected, actual } => {
                SessionError::Conflict { expected, actual }
            }
            other => SessionError::Store(other),
        }
    }
}
