use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use odyssey_core::{SessionId, StudentId};
use odyssey_ports::{Leaderboard, LeaderboardEntry, StoreResult};
use std::sync::Arc;

/// In-memory leaderboard
///
/// Holds at most one entry per student per session.
pub struct InMemoryLeaderboard {
    entries: Arc<DashMap<(SessionId, StudentId), LeaderboardEntry>>,
}

impl InMemoryLeaderboard {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
        }
    }
}

impl Default for InMemoryLeaderboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for InMemoryLeaderboard {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

#[async_trait]
impl Leaderboard for InMemoryLeaderboard {
    async fn record(&self, entry: LeaderboardEntry) -> StoreResult<bool> {
        match self
            .entries
            .entry((entry.session_id, entry.student_id.clone()))
        {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(entry);
                Ok(true)
            }
        }
    }

    async fn entries(&self, session_id: SessionId) -> StoreResult<Vec<LeaderboardEntry>> {
        let mut entries: Vec<LeaderboardEntry> = self
            .entries
            .iter()
            .filter(|e| e.key().0 == session_id)
            .map(|e| e.value().clone())
            .collect();
        entries.sort_by(|a, b| b.final_value.total_cmp(&a.final_value));
        Ok(entries)
    }
}
