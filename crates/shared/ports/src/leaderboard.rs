use async_trait::async_trait;
use odyssey_core::{Amount, SectionId, SessionId, StudentId, Timestamp};
use serde::{Deserialize, Serialize};

use crate::error::StoreResult;

/// Final result of one student in one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub session_id: SessionId,
    pub section_id: SectionId,
    pub student_id: StudentId,
    pub final_value: Amount,
    pub total_cash_injected: Amount,
    /// Return over starting cash plus injections, in percent
    pub adjusted_return_pct: f64,
    pub recorded_at: Timestamp,
}

/// Sink for final game results
#[async_trait]
pub trait Leaderboard: Send + Sync {
    /// Record an entry; returns `false` if the student already has one for the session
    async fn record(&self, entry: LeaderboardEntry) -> StoreResult<bool>;

    /// Entries for a session, best final value first
    async fn entries(&self, session_id: SessionId) -> StoreResult<Vec<LeaderboardEntry>>;
}
