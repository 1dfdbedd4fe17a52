//! Concurrent Instructor Test
//!
//! Two consoles pointed at the same session: the one whose version check
//! fails must not publish anything for the round.

use async_trait::async_trait;
use odyssey_clock::SystemClock;
use odyssey_core::{
    AUTHORITATIVE_OWNER, MarketState, PlayerState, SectionId, Session, SessionId, SessionStatus,
};
use odyssey_market::MarketEngine;
use odyssey_ports::{Clock, ParticipantSummary, SessionStore, StoreResult};
use odyssey_session::{InMemoryLeaderboard, InMemorySessionStore, InstructorConsole, SessionError};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Store where another instructor claims the round right before our first write lands
struct RacingStore {
    inner: InMemorySessionStore,
    raced: AtomicBool,
}

impl RacingStore {
    async fn rival_claims_round(&self, session_id: SessionId) {
        let mut session = self.inner.get_session(session_id).await.unwrap();
        let version = session.version;
        session.current_round += 1;
        session.status = SessionStatus::InProgress;
        self.inner.update_session(session, version).await.unwrap();
    }
}

#[async_trait]
impl SessionStore for RacingStore {
    async fn create_session(
        &self,
        section_id: SectionId,
        max_rounds: u32,
    ) -> StoreResult<SessionId> {
        self.inner.create_session(section_id, max_rounds).await
    }

    async fn get_session(&self, session_id: SessionId) -> StoreResult<Session> {
        self.inner.get_session(session_id).await
    }

    async fn update_session(
        &self,
        session: Session,
        expected_version: u64,
    ) -> StoreResult<Session> {
        if !self.raced.swap(true, Ordering::SeqCst) {
            self.rival_claims_round(session.id).await;
        }
        self.inner.update_session(session, expected_version).await
    }

    async fn delete_session(&self, session_id: SessionId) -> StoreResult<()> {
        self.inner.delete_session(session_id).await
    }

    async fn get_market_state(
        &self,
        session_id: SessionId,
        round: u32,
        owner_id: &str,
    ) -> StoreResult<MarketState> {
        self.inner.get_market_state(session_id, round, owner_id).await
    }

    async fn put_market_state(
        &self,
        session_id: SessionId,
        round: u32,
        owner_id: &str,
        market: MarketState,
    ) -> StoreResult<()> {
        self.inner
            .put_market_state(session_id, round, owner_id, market)
            .await
    }

    async fn get_player_state(
        &self,
        session_id: SessionId,
        student_id: &str,
    ) -> StoreResult<PlayerState> {
        self.inner.get_player_state(session_id, student_id).await
    }

    async fn put_player_state(
        &self,
        session_id: SessionId,
        student_id: &str,
        player: PlayerState,
    ) -> StoreResult<()> {
        self.inner
            .put_player_state(session_id, student_id, player)
            .await
    }

    async fn list_participants(
        &self,
        session_id: SessionId,
    ) -> StoreResult<Vec<ParticipantSummary>> {
        self.inner.list_participants(session_id).await
    }
}

/// The losing console gets Conflict and leaves the round unpublished
#[tokio::test]
async fn test_losing_instructor_gets_conflict() {
    let _ = env_logger::builder().is_test(true).try_init();

    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());
    let store = Arc::new(RacingStore {
        inner: InMemorySessionStore::new(clock.clone()),
        raced: AtomicBool::new(false),
    });
    let console = InstructorConsole::new(
        store.clone(),
        Arc::new(InMemoryLeaderboard::new()),
        clock,
        MarketEngine::default(),
    );

    let session = console.create_session("ECON-101", 20).await.unwrap();
    let err = console.advance_round(session.id).await.unwrap_err();
    assert!(matches!(err, SessionError::Conflict { expected: 0, actual: 1 }));

    // The rival owns round 1; this console wrote no market for it
    let current = store.get_session(session.id).await.unwrap();
    assert_eq!(current.current_round, 1);
    assert!(
        store
            .get_market_state(session.id, 1, AUTHORITATIVE_OWNER)
            .await
            .is_err()
    );
}

/// After losing, a fresh advance builds on the rival's round
#[tokio::test]
async fn test_retry_after_conflict_continues_from_rival_round() {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());
    let inner = InMemorySessionStore::new(clock.clone());
    let store = Arc::new(RacingStore {
        inner: inner.clone(),
        raced: AtomicBool::new(false),
    });
    let console = InstructorConsole::new(
        store.clone(),
        Arc::new(InMemoryLeaderboard::new()),
        clock,
        MarketEngine::default(),
    )
    .with_seed(3);

    let session = console.create_session("ECON-101", 20).await.unwrap();
    assert!(console.advance_round(session.id).await.is_err());

    // The rival publishes a flat round 1
    let mut rival_market = inner
        .get_market_state(session.id, 0, AUTHORITATIVE_OWNER)
        .await
        .unwrap();
    rival_market.round_number = 1;
    for history in rival_market.price_history.values_mut() {
        history.push(history[0]);
    }
    rival_market.cpi_history.push(rival_market.cpi);
    inner
        .put_market_state(session.id, 1, AUTHORITATIVE_OWNER, rival_market)
        .await
        .unwrap();

    let advanced = console.advance_round(session.id).await.unwrap();
    assert_eq!(advanced.current_round, 2);
    let market = store
        .get_market_state(session.id, 2, AUTHORITATIVE_OWNER)
        .await
        .unwrap();
    assert_eq!(market.round_number, 2);
    assert!(market.history_is_consistent());
}
