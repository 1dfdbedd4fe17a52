use log::{debug, info, warn};
use odyssey_core::{
    AUTHORITATIVE_OWNER, Amount, MarketState, SectionId, Session, SessionId, StudentId,
};
use odyssey_market::MarketEngine;
use odyssey_ports::{Clock, Leaderboard, SessionStore, StoreError};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::application::round_machine::{RoundMachine, RoundTransition};
use crate::error::{Result, SessionError};
use crate::model::GameSummary;

/// The instructor's console
///
/// Sole writer of sessions and of authoritative market states. Several
/// consoles may point at the same session; the store's version check makes
/// sure only one of them wins each round.
///
/// Students record their own final results. The console only fills in
/// students that never reported, when `end_game` is called on a completed
/// session.
pub struct InstructorConsole {
    store: Arc<dyn SessionStore>,
    leaderboard: Arc<dyn Leaderboard>,
    clock: Arc<dyn Clock>,
    market: MarketEngine,
    rng: Mutex<StdRng>,
    /// How long a claimed round may stay unpublished before this console republishes it
    republish_after: chrono::Duration,
}

impl InstructorConsole {
    pub fn new(
        store: Arc<dyn SessionStore>,
        leaderboard: Arc<dyn Leaderboard>,
        clock: Arc<dyn Clock>,
        market: MarketEngine,
    ) -> Self {
        Self {
            store,
            leaderboard,
            clock,
            market,
            rng: Mutex::new(StdRng::from_entropy()),
            republish_after: chrono::Duration::seconds(5),
        }
    }

    /// Use a seeded generator so the market path is reproducible
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    pub fn with_republish_after(mut self, after: chrono::Duration) -> Self {
        self.republish_after = after;
        self
    }

    /// Open a new session at round 0 with the initial market
    pub async fn create_session(
        &self,
        section_id: impl Into<SectionId>,
        max_rounds: u32,
    ) -> Result<Session> {
        let section_id = section_id.into();
        let id = self
            .store
            .create_session(section_id.clone(), max_rounds)
            .await?;
        self.store
            .put_market_state(id, 0, AUTHORITATIVE_OWNER, MarketState::initial())
            .await?;

        info!(
            "Created session {} for section {} ({} rounds)",
            id, section_id, max_rounds
        );
        Ok(self.store.get_session(id).await?)
    }

    pub async fn session(&self, session_id: SessionId) -> Result<Session> {
        Ok(self.store.get_session(session_id).await?)
    }

    /// Authoritative market for the session's current round
    pub async fn market(&self, session_id: SessionId) -> Result<MarketState> {
        let session = self.store.get_session(session_id).await?;
        Ok(self
            .store
            .get_market_state(session_id, session.current_round, AUTHORITATIVE_OWNER)
            .await?)
    }

    /// Move the session to its next round, or complete it after the last one
    ///
    /// The round is claimed with a version-checked session write before the
    /// new market is published; a console that loses the race gets
    /// `Conflict` and writes nothing. A round that was claimed but never
    /// published is republished first.
    pub async fn advance_round(&self, session_id: SessionId) -> Result<Session> {
        let session = self.store.get_session(session_id).await?;
        let transition = RoundMachine::advance(&session)?;
        self.republish_missing_market(&session).await?;

        let RoundTransition::Advanced { from, to } = transition else {
            return self.complete(session, transition).await;
        };

        let previous = self
            .store
            .get_market_state(session_id, from, AUTHORITATIVE_OWNER)
            .await?;
        let next_market = {
            let mut rng = self.rng.lock().await;
            self.market.advance(&previous, &mut *rng)
        };

        let mut next = RoundMachine::apply(&session, transition, self.clock.now());
        next.participants = self.participants(session_id).await?;
        let saved = self.store.update_session(next, session.version).await?;

        self.store
            .put_market_state(session_id, to, AUTHORITATIVE_OWNER, next_market)
            .await?;

        info!(
            "Session {} advanced to round {}/{}",
            session_id, to, saved.max_rounds
        );
        Ok(saved)
    }

    /// End the game now
    ///
    /// Ending an already completed game records a result for every
    /// participant that is still missing from the leaderboard.
    pub async fn end_game(&self, session_id: SessionId) -> Result<Session> {
        let session = self.store.get_session(session_id).await?;
        self.republish_missing_market(&session).await?;
        if session.is_completed() {
            debug!("Session {} already completed", session_id);
            self.sweep_missing_results(&session).await?;
            return Ok(session);
        }

        let transition = RoundMachine::end(&session)?;
        self.complete(session, transition).await
    }

    async fn complete(&self, session: Session, transition: RoundTransition) -> Result<Session> {
        let mut next = RoundMachine::apply(&session, transition, self.clock.now());
        next.participants = self.participants(session.id).await?;
        let saved = self.store.update_session(next, session.version).await?;

        info!(
            "Session {} completed at round {}",
            saved.id, saved.current_round
        );
        Ok(saved)
    }

    /// Record every participant of a completed session that never reported
    ///
    /// Returns how many entries were new.
    pub async fn record_missing_results(&self, session_id: SessionId) -> Result<usize> {
        let session = self.store.get_session(session_id).await?;
        if !session.is_completed() {
            return Err(SessionError::InvalidTransition {
                action: "record results of",
                status: session.status,
            });
        }
        self.republish_missing_market(&session).await?;
        self.sweep_missing_results(&session).await
    }

    /// Record participants that never reported, from their persisted state
    async fn sweep_missing_results(&self, session: &Session) -> Result<usize> {
        let market = self
            .store
            .get_market_state(session.id, session.current_round, AUTHORITATIVE_OWNER)
            .await?;

        let mut recorded = 0;
        for participant in self.store.list_participants(session.id).await? {
            let player = self
                .store
                .get_player_state(session.id, &participant.student_id)
                .await?;
            let summary = GameSummary::new(session.id, participant.student_id, &player, &market);
            let entry = summary.leaderboard_entry(session.section_id.clone(), self.clock.now());

            if self.leaderboard.record(entry).await? {
                info!(
                    "Leaderboard: {} never reported, recorded {:.2}",
                    summary.student_id, summary.portfolio.total_value
                );
                recorded += 1;
            } else {
                debug!("Leaderboard already has {}", summary.student_id);
            }
        }
        Ok(recorded)
    }

    /// Write the authoritative market for the session's current round if it is missing
    ///
    /// Covers an advance whose session write landed but whose market write did
    /// not. A round claimed less than `republish_after` ago may still be
    /// published by the console that claimed it, so it is reported as
    /// `SyncUnavailable` instead.
    async fn republish_missing_market(&self, session: &Session) -> Result<()> {
        let round = session.current_round;
        match self
            .store
            .get_market_state(session.id, round, AUTHORITATIVE_OWNER)
            .await
        {
            Ok(_) => return Ok(()),
            Err(StoreError::MarketStateNotFound { .. }) => {}
            Err(e) => return Err(e.into()),
        }

        if self.clock.now() - session.updated_at < self.republish_after {
            debug!(
                "Session {} round {} not published yet, leaving it to its claimer",
                session.id, round
            );
            return Err(SessionError::SyncUnavailable { round });
        }

        let market = match round.checked_sub(1) {
            None => MarketState::initial(),
            Some(previous_round) => {
                let previous = self
                    .store
                    .get_market_state(session.id, previous_round, AUTHORITATIVE_OWNER)
                    .await?;
                let mut rng = self.rng.lock().await;
                self.market.advance(&previous, &mut *rng)
            }
        };

        warn!(
            "Session {} round {} was never published, republishing",
            session.id, round
        );
        self.store
            .put_market_state(session.id, round, AUTHORITATIVE_OWNER, market)
            .await?;
        Ok(())
    }

    async fn participants(&self, session_id: SessionId) -> Result<BTreeMap<StudentId, Amount>> {
        Ok(self
            .store
            .list_participants(session_id)
            .await?
            .into_iter()
            .map(|p| (p.student_id, p.portfolio_value))
            .collect())
    }
}
