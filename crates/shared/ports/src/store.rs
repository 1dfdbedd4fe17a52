use async_trait::async_trait;
use odyssey_core::{Amount, MarketState, PlayerState, SectionId, Session, SessionId, StudentId};
use serde::{Deserialize, Serialize};

use crate::error::StoreResult;

/// A participant as listed by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantSummary {
    pub student_id: StudentId,
    /// Last end-of-round value the student persisted
    pub portfolio_value: Amount,
}

/// External store shared by the instructor and every student
///
/// This is the only synchronization point between clients. Market data is
/// keyed by `(session, round, owner)`, where the owner
/// [`AUTHORITATIVE_OWNER`](odyssey_core::AUTHORITATIVE_OWNER) marks the
/// instructor's record; player data is keyed by `(session, student)`.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Create a new session at round 0 and return its id
    async fn create_session(&self, section_id: SectionId, max_rounds: u32)
    -> StoreResult<SessionId>;

    /// Get a session by id
    async fn get_session(&self, session_id: SessionId) -> StoreResult<Session>;

    /// Write a session if the stored version still equals `expected_version`
    ///
    /// On success the stored copy has its version bumped and is returned.
    async fn update_session(&self, session: Session, expected_version: u64)
    -> StoreResult<Session>;

    /// Remove a session and everything keyed under it
    async fn delete_session(&self, session_id: SessionId) -> StoreResult<()>;

    /// Get the market state one owner wrote for a round
    async fn get_market_state(
        &self,
        session_id: SessionId,
        round: u32,
        owner_id: &str,
    ) -> StoreResult<MarketState>;

    /// Save (insert or overwrite) the market state for a round and owner
    async fn put_market_state(
        &self,
        session_id: SessionId,
        round: u32,
        owner_id: &str,
        market: MarketState,
    ) -> StoreResult<()>;

    /// Get a student's player state
    async fn get_player_state(
        &self,
        session_id: SessionId,
        student_id: &str,
    ) -> StoreResult<PlayerState>;

    /// Save (insert or overwrite) a student's player state
    async fn put_player_state(
        &self,
        session_id: SessionId,
        student_id: &str,
        player: PlayerState,
    ) -> StoreResult<()>;

    /// List every student with a player state in the session
    async fn list_participants(&self, session_id: SessionId)
    -> StoreResult<Vec<ParticipantSummary>>;
}
