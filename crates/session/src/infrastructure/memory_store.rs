use async_trait::async_trait;
use dashmap::DashMap;
use odyssey_core::{MarketState, PlayerState, SectionId, Session, SessionId, StudentId};
use odyssey_ports::{Clock, ParticipantSummary, SessionStore, StoreError, StoreResult};
use std::sync::Arc;

type MarketKey = (SessionId, u32, String);
type PlayerKey = (SessionId, StudentId);

/// In-memory session store
///
/// Thread-safe storage for sessions, market states and player states
/// using DashMap. Suitable for simulation and testing; clones share the
/// same underlying maps, so every client handed a clone sees the same data.
pub struct InMemorySessionStore {
    clock: Arc<dyn Clock>,
    sessions: Arc<DashMap<SessionId, Session>>,
    markets: Arc<DashMap<MarketKey, MarketState>>,
    players: Arc<DashMap<PlayerKey, PlayerState>>,
}

impl InMemorySessionStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            sessions: Arc::new(DashMap::new()),
            markets: Arc::new(DashMap::new()),
            players: Arc::new(DashMap::new()),
        }
    }

    fn ensure_session(&self, session_id: SessionId) -> StoreResult<()> {
        if self.sessions.contains_key(&session_id) {
            Ok(())
        } else {
            Err(StoreError::SessionNotFound(session_id))
        }
    }
}

impl Clone for InMemorySessionStore {
    fn clone(&self) -> Self {
        Self {
            clock: Arc::clone(&self.clock),
            sessions: Arc::clone(&self.sessions),
            markets: Arc::clone(&self.markets),
            players: Arc::clone(&self.players),
        }
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create_session(
        &self,
        section_id: SectionId,
        max_rounds: u32,
    ) -> StoreResult<SessionId> {
        let session = Session::new(section_id, max_rounds, self.clock.now());
        let id = session.id;
        self.sessions.insert(id, session);
        Ok(id)
    }

    async fn get_session(&self, session_id: SessionId) -> StoreResult<Session> {
        self.sessions
            .get(&session_id)
            .map(|s| s.value().clone())
            .ok_or(StoreError::SessionNotFound(session_id))
    }

    async fn update_session(
        &self,
        mut session: Session,
        expected_version: u64,
    ) -> StoreResult<Session> {
        // The entry guard holds the shard lock for the whole compare-and-swap
        let mut stored = self
            .sessions
            .get_mut(&session.id)
            .ok_or(StoreError::SessionNotFound(session.id))?;

        if stored.version != expected_version {
            return Err(StoreError::VersionConflict {
                expected: expected_version,
                actual: stored.version,
            });
        }

        session.version = expected_version + 1;
        session.updated_at = self.clock.now();
        *stored = session.clone();
        Ok(session)
    }

    async fn delete_session(&self, session_id: SessionId) -> StoreResult<()> {
        self.sessions
            .remove(&session_id)
            .ok_or(StoreError::SessionNotFound(session_id))?;
        self.markets.retain(|(id, _, _), _| *id != session_id);
        self.players.retain(|(id, _), _| *id != session_id);
        Ok(())
    }

    async fn get_market_state(
        &self,
        session_id: SessionId,
        round: u32,
        owner_id: &str,
    ) -> StoreResult<MarketState> {
        self.ensure_session(session_id)?;
        self.markets
            .get(&(session_id, round, owner_id.to_string()))
            .map(|m| m.value().clone())
            .ok_or_else(|| StoreError::MarketStateNotFound {
                session_id,
                round,
                owner_id: owner_id.to_string(),
            })
    }

    async fn put_market_state(
        &self,
        session_id: SessionId,
        round: u32,
        owner_id: &str,
        market: MarketState,
    ) -> StoreResult<()> {
        self.ensure_session(session_id)?;
        self.markets
            .insert((session_id, round, owner_id.to_string()), market);
        Ok(())
    }

    async fn get_player_state(
        &self,
        session_id: SessionId,
        student_id: &str,
    ) -> StoreResult<PlayerState> {
        self.ensure_session(session_id)?;
        self.players
            .get(&(session_id, student_id.to_string()))
            .map(|p| p.value().clone())
            .ok_or_else(|| StoreError::PlayerStateNotFound {
                session_id,
                student_id: student_id.to_string(),
            })
    }

    async fn put_player_state(
        &self,
        session_id: SessionId,
        student_id: &str,
        player: PlayerState,
    ) -> StoreResult<()> {
        self.ensure_session(session_id)?;
        self.players
            .insert((session_id, student_id.to_string()), player);
        Ok(())
    }

    async fn list_participants(
        &self,
        session_id: SessionId,
    ) -> StoreResult<Vec<ParticipantSummary>> {
        self.ensure_session(session_id)?;
        let mut participants: Vec<ParticipantSummary> = self
            .players
            .iter()
            .filter(|entry| entry.key().0 == session_id)
            .map(|entry| ParticipantSummary {
                student_id: entry.key().1.clone(),
                portfolio_value: entry.value().latest_recorded_value(),
            })
            .collect();
        participants.sort_by(|a, b| a.student_id.cmp(&b.student_id));
        Ok(participants)
    }
}
