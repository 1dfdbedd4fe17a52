use log::{debug, info, warn};
use odyssey_clock::ScheduledTask;
use odyssey_core::{AssetId, MarketState, PlayerState, Session, SessionId, StudentId, Trade};
use odyssey_market::{CashInjectionConfig, MarketConfig, MarketEngine};
use odyssey_order_manager::{BulkOutcome, PortfolioSummary, TradeEngine, TradeOrder};
use odyssey_ports::{Clock, Leaderboard, SessionStore, StoreError, Ticker};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use crate::application::reconciler::{LocalState, ReconcilerConfig, SessionReconciler, SyncPhase};
use crate::error::{Result, SessionError};
use crate::model::{GameSummary, SyncOutcome};

/// Settings a student client is created with
#[derive(Debug, Clone, Default)]
pub struct StudentSettings {
    pub reconciler: ReconcilerConfig,
    pub injection: CashInjectionConfig,
    /// Market model used when generating rounds offline
    pub market: MarketConfig,
    /// Seed for injections and offline rounds; entropy when `None`
    pub seed: Option<u64>,
}

/// One student's view of a session
///
/// Owns the student's player state. Trades run against the local market
/// mirror and are persisted right away; `poll` pulls new rounds in. Every
/// player write is made under the local write lock.
pub struct StudentClient {
    session_id: SessionId,
    student_id: StudentId,
    reconciler: SessionReconciler,
    trades: TradeEngine,
    offline_market: MarketEngine,
    state: RwLock<LocalState>,
    flushed: AtomicBool,
}

impl StudentClient {
    /// Join a session, creating the player on first join and resuming it otherwise
    pub async fn join(
        store: Arc<dyn SessionStore>,
        clock: Arc<dyn Clock>,
        session_id: SessionId,
        student_id: impl Into<StudentId>,
        settings: StudentSettings,
    ) -> Result<Self> {
        let student_id = student_id.into();
        let session = store.get_session(session_id).await?;

        let (mut player, round) = match store.get_player_state(session_id, &student_id).await {
            Ok(player) => {
                // Resume from the last round this player closed
                let seen = player.portfolio_value_history.len().saturating_sub(1) as u32;
                (player, seen.min(session.current_round))
            }
            Err(StoreError::PlayerStateNotFound { .. }) => {
                (PlayerState::new(), session.current_round)
            }
            Err(e) => return Err(e.into()),
        };

        let mut market = match store
            .get_market_state(session_id, round, &settings.reconciler.owner_id)
            .await
        {
            Ok(market) => market,
            Err(StoreError::MarketStateNotFound { round, .. }) => {
                return Err(SessionError::SyncUnavailable { round });
            }
            Err(e) => return Err(e.into()),
        };
        if let Some((_, last)) = player.cash_injections.last_key_value() {
            market.last_cash_injection = *last;
        }
        market.total_cash_injected = player.total_cash_injected();

        let value = player.total_value(&market);
        player.record_round_value(round, value);
        store
            .put_player_state(session_id, &student_id, player.clone())
            .await?;

        info!(
            "[{}] Joined session {} at round {}",
            student_id, session_id, round
        );

        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let reconciler = SessionReconciler::new(
            store,
            clock.clone(),
            settings.reconciler,
            settings.injection,
            session_id,
            student_id.clone(),
        );

        Ok(Self {
            session_id,
            student_id,
            reconciler,
            trades: TradeEngine::new(clock),
            offline_market: MarketEngine::new(settings.market),
            state: RwLock::new(LocalState {
                session,
                market,
                player,
                phase: SyncPhase::Online,
                failed_syncs: 0,
                rng,
            }),
            flushed: AtomicBool::new(false),
        })
    }

    /// Record this student's final result on `leaderboard` at game over
    pub fn with_leaderboard(mut self, leaderboard: Arc<dyn Leaderboard>) -> Self {
        self.reconciler = self.reconciler.with_leaderboard(leaderboard);
        self
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn student_id(&self) -> &str {
        &self.student_id
    }

    pub async fn player(&self) -> PlayerState {
        self.state.read().await.player.clone()
    }

    pub async fn market(&self) -> MarketState {
        self.state.read().await.market.clone()
    }

    /// Last session copy seen by this client
    pub async fn session(&self) -> Session {
        self.state.read().await.session.clone()
    }

    pub async fn round(&self) -> u32 {
        self.state.read().await.market.round_number
    }

    pub async fn phase(&self) -> SyncPhase {
        self.state.read().await.phase
    }

    pub async fn is_offline(&self) -> bool {
        self.phase().await == SyncPhase::Offline
    }

    pub async fn total_value(&self) -> f64 {
        let state = self.state.read().await;
        state.player.total_value(&state.market)
    }

    pub async fn portfolio_summary(&self) -> PortfolioSummary {
        let state = self.state.read().await;
        PortfolioSummary::new(&state.player, &state.market)
    }

    /// Pin an order to the prices currently shown
    pub async fn quote(&self, order: TradeOrder) -> TradeOrder {
        order.quoted_from(&self.state.read().await.market)
    }

    /// Execute one order against the local market
    pub async fn trade(&self, order: TradeOrder) -> Result<Trade> {
        let mut state = self.state.write().await;
        Self::ensure_trading(&state)?;

        let outcome = self
            .trades
            .execute_trade(&state.player, &state.market, &order)
            .inspect_err(|e| debug!("[{}] Trade rejected: {}", self.student_id, e))?;
        state.player = outcome.player;
        Self::refresh_round_value(&mut state);

        self.persist(&state).await;
        Ok(outcome.trade)
    }

    pub async fn buy_all(&self) -> Result<BulkOutcome> {
        self.bulk(|engine, player, market| engine.buy_all(player, market)).await
    }

    pub async fn buy_selected(&self, assets: &[AssetId]) -> Result<BulkOutcome> {
        self.bulk(|engine, player, market| engine.buy_selected(player, market, assets))
            .await
    }

    pub async fn sell_all(&self) -> Result<BulkOutcome> {
        self.bulk(|engine, player, market| engine.sell_all(player, market)).await
    }

    async fn bulk<F>(&self, run: F) -> Result<BulkOutcome>
    where
        F: FnOnce(&TradeEngine, &PlayerState, &MarketState) -> BulkOutcome,
    {
        let mut state = self.state.write().await;
        Self::ensure_trading(&state)?;

        let outcome = run(&self.trades, &state.player, &state.market);
        state.player = outcome.player.clone();
        Self::refresh_round_value(&mut state);

        self.persist(&state).await;
        Ok(outcome)
    }

    /// Catch up with the instructor
    pub async fn poll(&self) -> Result<SyncOutcome> {
        self.reconciler.poll(&self.state).await
    }

    /// Generate the next round locally; only while offline
    pub async fn advance_offline(&self) -> Result<SyncOutcome> {
        let mut state = self.state.write().await;
        if state.phase != SyncPhase::Offline {
            return Err(SessionError::NotOffline);
        }

        let from = state.market.round_number;
        if from >= state.session.max_rounds {
            state.phase = SyncPhase::Finished;
            let summary = GameSummary::new(
                self.session_id,
                self.student_id.clone(),
                &state.player,
                &state.market,
            );
            info!(
                "[{}] Offline game over at round {}: {:.2}",
                self.student_id, from, summary.portfolio.total_value
            );
            self.reconciler
                .record_result(state.session.section_id.clone(), &summary)
                .await;
            return Ok(SyncOutcome::GameOver(summary));
        }

        let next = {
            let LocalState { market, rng, .. } = &mut *state;
            self.offline_market.advance(market, rng)
        };
        let to = next.round_number;
        state.market.overlay_from(&next);
        let injected = state.close_round(to, self.reconciler.injection(), &next);
        state.session.current_round = to;

        debug!(
            "[{}] Offline round {} -> {} (injected {:.2})",
            self.student_id, from, to, injected
        );
        Ok(SyncOutcome::Advanced { from, to, injected })
    }

    /// Poll on every tick until the game is over or the client goes offline
    pub fn start_polling<T>(self: &Arc<Self>, ticker: T) -> ScheduledTask
    where
        T: Ticker + 'static,
    {
        let client = Arc::clone(self);
        ScheduledTask::spawn(format!("poll-{}", self.student_id), ticker, move |_| {
            let client = Arc::clone(&client);
            async move {
                match client.poll().await {
                    Ok(SyncOutcome::GameOver(_)) | Ok(SyncOutcome::Offline) => {
                        ControlFlow::Break(())
                    }
                    Ok(_) => ControlFlow::Continue(()),
                    Err(SessionError::SyncUnavailable { .. }) => ControlFlow::Continue(()),
                    Err(e) => {
                        warn!("[{}] Poll failed: {}", client.student_id, e);
                        ControlFlow::Continue(())
                    }
                }
            }
        })
    }

    /// Final best-effort save of the player state; only the first call writes
    pub async fn shutdown(&self) {
        if self.flushed.swap(true, Ordering::SeqCst) {
            return;
        }

        let state = self.state.read().await;
        if state.phase == SyncPhase::Offline {
            debug!("[{}] Offline, skipping final flush", self.student_id);
            return;
        }

        match self.reconciler.save_player(&state.player).await {
            Ok(()) => debug!("[{}] Flushed player state", self.student_id),
            Err(e) => warn!("[{}] Final flush failed: {}", self.student_id, e),
        }
    }

    fn ensure_trading(state: &LocalState) -> Result<()> {
        if state.phase == SyncPhase::Finished {
            return Err(SessionError::InvalidTransition {
                action: "trade in",
                status: state.session.status,
            });
        }
        Ok(())
    }

    fn refresh_round_value(state: &mut LocalState) {
        let round = state.market.round_number;
        let value = state.player.total_value(&state.market);
        state.player.record_round_value(round, value);
    }

    /// Save while the caller still holds the write lock
    async fn persist(&self, state: &LocalState) {
        if state.phase == SyncPhase::Offline {
            return;
        }
        if let Err(e) = self.reconciler.save_player(&state.player).await {
            warn!("[{}] Could not save player state: {}", self.student_id, e);
        }
    }
}
