//! Session reconciliation
//!
//! Each student client keeps a local mirror of the session and market and
//! polls the store to catch up with the instructor:
//!
//! ```text
//! poll ─► get_session ──┬── gone ───────────────────────────► Offline
//!                       ├── round ≤ local ──┬── completed ──► GameOver (once)
//!                       │                   └────────────────► Unchanged
//!                       └── round > local ─► get_market_state(round, TA)
//!                                              ├── missing ──► SyncUnavailable (retry next tick)
//!                                              └── found ────► overlay, inject, persist ─► Advanced
//! ```
//!
//! Store reads happen without holding the local lock. Player writes happen
//! under the write lock, so snapshots reach the store in the order they were
//! taken. On game over the student records its own leaderboard entry.

use log::{debug, info, warn};
use odyssey_core::{
    AUTHORITATIVE_OWNER, MarketState, PlayerState, SectionId, Session, SessionId, StudentId,
};
use odyssey_market::CashInjectionConfig;
use odyssey_ports::{Clock, Leaderboard, SessionStore, StoreError};
use rand::rngs::StdRng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::error::{Result, SessionError};
use crate::model::{GameSummary, SyncOutcome};

/// Default time between polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5_000);

#[derive(Debug, Clone)]
pub struct ReconcilerConfig {
    pub poll_interval: Duration,
    /// Owner whose market records are authoritative
    pub owner_id: String,
    /// Consecutive unavailable rounds tolerated before going offline; `None` retries forever
    pub sync_retry_limit: Option<u32>,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            owner_id: AUTHORITATIVE_OWNER.to_string(),
            sync_retry_limit: None,
        }
    }
}

/// Where a client stands relative to the shared session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    /// Following the instructor's rounds
    Online,
    /// Game over has been reported
    Finished,
    /// Session is unreachable; rounds are generated locally
    Offline,
}

/// Everything a student client holds locally
pub(crate) struct LocalState {
    pub session: Session,
    pub market: MarketState,
    pub player: PlayerState,
    pub phase: SyncPhase,
    pub failed_syncs: u32,
    pub rng: StdRng,
}

impl LocalState {
    /// Credit the injection for `round` and record the round's closing value
    ///
    /// `price_source` holds the round's prices in its history.
    pub fn close_round(
        &mut self,
        round: u32,
        injection: &CashInjectionConfig,
        price_source: &MarketState,
    ) -> f64 {
        let amount = injection.amount(round, &mut self.rng);
        let injected = if self.player.apply_cash_injection(round, amount) {
            self.market.record_cash_injection(amount);
            amount
        } else {
            0.0
        };

        let value = self.player.cash
            + self
                .player
                .holdings_value_with(|asset| price_source.historical_price(asset, round));
        self.player.record_round_value(round, value);
        injected
    }
}

/// Polls the store and folds new rounds into a client's local state
pub struct SessionReconciler {
    store: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
    leaderboard: Option<Arc<dyn Leaderboard>>,
    config: ReconcilerConfig,
    injection: CashInjectionConfig,
    session_id: SessionId,
    student_id: StudentId,
}

impl SessionReconciler {
    pub fn new(
        store: Arc<dyn SessionStore>,
        clock: Arc<dyn Clock>,
        config: ReconcilerConfig,
        injection: CashInjectionConfig,
        session_id: SessionId,
        student_id: impl Into<StudentId>,
    ) -> Self {
        Self {
            store,
            clock,
            leaderboard: None,
            config,
            injection,
            session_id,
            student_id: student_id.into(),
        }
    }

    /// Record the final result here when the game ends
    pub fn with_leaderboard(mut self, leaderboard: Arc<dyn Leaderboard>) -> Self {
        self.leaderboard = Some(leaderboard);
        self
    }

    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    pub fn injection(&self) -> &CashInjectionConfig {
        &self.injection
    }

    /// One reconciliation step
    pub(crate) async fn poll(&self, local: &RwLock<LocalState>) -> Result<SyncOutcome> {
        let (local_round, phase) = {
            let state = local.read().await;
            (state.market.round_number, state.phase)
        };

        match phase {
            SyncPhase::Offline => return Ok(SyncOutcome::Offline),
            SyncPhase::Finished => return Ok(SyncOutcome::Unchanged),
            SyncPhase::Online => {}
        }

        let remote = match self.store.get_session(self.session_id).await {
            Ok(session) => session,
            Err(StoreError::SessionNotFound(_)) => return Ok(self.go_offline(local).await),
            Err(e) => return Err(e.into()),
        };

        if remote.current_round <= local_round {
            if remote.current_round < local_round {
                debug!(
                    "[{}] Stale session read (round {} < local {})",
                    self.student_id, remote.current_round, local_round
                );
            }
            return if remote.is_completed() && remote.current_round == local_round {
                self.finish(local, remote).await
            } else {
                Ok(SyncOutcome::Unchanged)
            };
        }

        let latest = match self
            .store
            .get_market_state(self.session_id, remote.current_round, &self.config.owner_id)
            .await
        {
            Ok(market) => market,
            Err(StoreError::MarketStateNotFound { round, .. }) => {
                return self.sync_unavailable(local, round).await;
            }
            Err(StoreError::SessionNotFound(_)) => return Ok(self.go_offline(local).await),
            Err(e) => return Err(e.into()),
        };

        let Some(outcome) = self.catch_up(local, &remote, &latest).await? else {
            return Ok(SyncOutcome::Unchanged);
        };

        if remote.is_completed() {
            return self.finish(local, remote).await;
        }
        Ok(outcome)
    }

    /// Apply every round between the local one and `latest`
    ///
    /// Returns `None` when another poll already got there first.
    async fn catch_up(
        &self,
        local: &RwLock<LocalState>,
        remote: &Session,
        latest: &MarketState,
    ) -> Result<Option<SyncOutcome>> {
        let mut state = local.write().await;
        let from = state.market.round_number;
        let to = latest.round_number;
        if to <= from {
            return Ok(None);
        }

        state.market.overlay_from(latest);
        let mut injected = 0.0;
        for round in from + 1..=to {
            injected += state.close_round(round, &self.injection, latest);
        }
        state.session = remote.clone();
        state.failed_syncs = 0;

        info!(
            "[{}] Synced round {} -> {} (injected {:.2})",
            self.student_id, from, to, injected
        );

        self.save_player(&state.player).await?;
        self.store
            .put_market_state(self.session_id, to, &self.student_id, state.market.clone())
            .await?;

        Ok(Some(SyncOutcome::Advanced { from, to, injected }))
    }

    /// Report game over once and put the final value on the leaderboard
    async fn finish(&self, local: &RwLock<LocalState>, remote: Session) -> Result<SyncOutcome> {
        let section_id = remote.section_id.clone();
        let summary = {
            let mut state = local.write().await;
            if state.phase != SyncPhase::Online {
                return Ok(SyncOutcome::Unchanged);
            }
            self.save_player(&state.player).await?;

            state.phase = SyncPhase::Finished;
            state.session = remote;
            GameSummary::new(
                self.session_id,
                self.student_id.clone(),
                &state.player,
                &state.market,
            )
        };

        info!(
            "[{}] Game over at round {}: {:.2} ({:+.2}%)",
            self.student_id,
            summary.final_round,
            summary.portfolio.total_value,
            summary.portfolio.adjusted_return_pct
        );

        self.record_result(section_id, &summary).await;
        Ok(SyncOutcome::GameOver(summary))
    }

    /// Best effort; the first entry recorded for a student stays
    pub(crate) async fn record_result(&self, section_id: SectionId, summary: &GameSummary) {
        let Some(leaderboard) = &self.leaderboard else {
            return;
        };

        let entry = summary.leaderboard_entry(section_id, self.clock.now());
        match leaderboard.record(entry).await {
            Ok(true) => info!(
                "[{}] Recorded final value {:.2}",
                self.student_id, summary.portfolio.total_value
            ),
            Ok(false) => debug!("[{}] Already on the leaderboard", self.student_id),
            Err(e) => warn!("[{}] Could not record final result: {}", self.student_id, e),
        }
    }

    /// Callers hold the local write lock while this runs
    pub(crate) async fn save_player(&self, player: &PlayerState) -> Result<()> {
        self.store
            .put_player_state(self.session_id, &self.student_id, player.clone())
            .await?;
        Ok(())
    }

    async fn sync_unavailable(
        &self,
        local: &RwLock<LocalState>,
        round: u32,
    ) -> Result<SyncOutcome> {
        let mut state = local.write().await;
        state.failed_syncs += 1;

        if self
            .config
            .sync_retry_limit
            .is_some_and(|limit| state.failed_syncs >= limit)
        {
            warn!(
                "[{}] Round {} still unavailable after {} attempts, going offline",
                self.student_id, round, state.failed_syncs
            );
            state.phase = SyncPhase::Offline;
            return Ok(SyncOutcome::Offline);
        }

        warn!(
            "[{}] Round {} not published yet (attempt {}), retrying next tick",
            self.student_id, round, state.failed_syncs
        );
        Err(SessionError::SyncUnavailable { round })
    }

    async fn go_offline(&self, local: &RwLock<LocalState>) -> SyncOutcome {
        let mut state = local.write().await;
        if state.phase == SyncPhase::Online {
            warn!(
                "[{}] Session {} is gone, switching to local market generation",
                self.student_id, self.session_id
            );
            state.phase = SyncPhase::Offline;
        }
        SyncOutcome::Offline
    }
}
