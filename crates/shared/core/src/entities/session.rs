use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::values::{Amount, SectionId, SessionId, StudentId};

/// Default number of rounds in a game
pub const DEFAULT_MAX_ROUNDS: u32 = 20;

/// Session lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionStatus {
    /// Round 0, nobody has advanced yet
    Created,
    /// Rounds 1..=max_rounds
    InProgress,
    /// Game over, market frozen
    Completed,
}

impl SessionStatus {
    /// Returns true if the game is over
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Completed)
    }

    /// Returns true if rounds can still be advanced
    pub fn is_active(&self) -> bool {
        matches!(self, SessionStatus::Created | SessionStatus::InProgress)
    }
}

/// A classroom game session, authored by one instructor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub section_id: SectionId,
    pub current_round: u32,
    pub max_rounds: u32,
    pub status: SessionStatus,
    /// Latest known portfolio value per participant
    pub participants: BTreeMap<StudentId, Amount>,
    /// Bumped on every successful write
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Create a new session at round 0
    pub fn new(section_id: impl Into<SectionId>, max_rounds: u32, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            section_id: section_id.into(),
            current_round: 0,
            max_rounds,
            status: SessionStatus::Created,
            participants: BTreeMap::new(),
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status.is_terminal()
    }

    /// Rounds still to be played
    pub fn rounds_remaining(&self) -> u32 {
        self.max_rounds.saturating_sub(self.current_round)
    }
}
