//! Agent Runner - Drives one simulated student through a game
//!
//! Each agent wraps a strategy and a [`StudentClient`]:
//! - Polling the session on every tick
//! - Letting the strategy trade once per new round
//! - Playing on with locally generated rounds if the session disappears
//! - Flushing the player state once when it stops

use log::{debug, info, warn};
use odyssey_clock::CancellationToken;
use odyssey_core::StudentId;
use odyssey_ports::Ticker;
use odyssey_session::{GameSummary, SessionError, StudentClient, SyncOutcome};
use std::ops::ControlFlow;
use std::sync::Arc;

use crate::strategy::{Action, StrategyContext, StudentStrategy};

/// What one agent did during the game
#[derive(Debug, Clone, Default)]
pub struct AgentReport {
    pub student_id: StudentId,
    pub strategy: String,
    /// Trades that executed
    pub trades: u64,
    /// Actions refused as a whole (stale quote, game over, ...)
    pub rejected: u64,
    /// Orders inside bulk actions that were skipped
    pub skipped: u64,
    pub last_round: u32,
    pub went_offline: bool,
    pub summary: Option<GameSummary>,
}

/// Agent runner - wraps a strategy and manages its lifecycle
pub struct AgentRunner {
    client: Arc<StudentClient>,
    strategy: Box<dyn StudentStrategy>,
    token: CancellationToken,
    report: AgentReport,
}

impl AgentRunner {
    pub fn new(client: Arc<StudentClient>, strategy: Box<dyn StudentStrategy>) -> Self {
        let report = AgentReport {
            student_id: client.student_id().to_string(),
            strategy: strategy.name().to_string(),
            ..Default::default()
        };

        Self {
            client,
            strategy,
            token: CancellationToken::new(),
            report,
        }
    }

    pub fn student_id(&self) -> &str {
        self.client.student_id()
    }

    /// Token that stops [`run`](Self::run) after the current tick
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Trade the round the student joined in, before any polling
    pub async fn open(&mut self) {
        self.report.last_round = self.client.round().await;
        self.trade_round().await;
    }

    /// Run the agent until the game is over or it is cancelled
    pub async fn run<T: Ticker>(mut self, mut ticker: T) -> AgentReport {
        info!(
            "[{}] Agent started ({})",
            self.student_id(),
            self.strategy.name()
        );

        let token = self.token.clone();
        loop {
            let tick = tokio::select! {
                biased;
                _ = token.cancelled() => {
                    debug!("[{}] Agent cancelled", self.student_id());
                    None
                }
                tick = ticker.tick() => tick,
            };
            if tick.is_none() || self.on_tick().await.is_break() {
                break;
            }
        }

        self.client.shutdown().await;
        info!(
            "[{}] Agent stopped at round {}: {} trades, {} rejected",
            self.student_id(),
            self.report.last_round,
            self.report.trades,
            self.report.rejected
        );
        self.report
    }

    async fn on_tick(&mut self) -> ControlFlow<()> {
        let outcome = if self.report.went_offline {
            self.client.advance_offline().await
        } else {
            self.client.poll().await
        };

        match outcome {
            Ok(SyncOutcome::Advanced { to, .. }) => {
                self.report.last_round = to;
                self.trade_round().await;
                ControlFlow::Continue(())
            }
            Ok(SyncOutcome::GameOver(summary)) => {
                self.strategy.on_game_over(&summary).await;
                self.report.last_round = summary.final_round;
                self.report.summary = Some(summary);
                ControlFlow::Break(())
            }
            Ok(SyncOutcome::Offline) => {
                warn!(
                    "[{}] Session unreachable, playing on locally",
                    self.student_id()
                );
                self.report.went_offline = true;
                ControlFlow::Continue(())
            }
            Ok(SyncOutcome::Unchanged) | Err(SessionError::SyncUnavailable { .. }) => {
                ControlFlow::Continue(())
            }
            Err(e) => {
                warn!("[{}] Sync failed: {}", self.student_id(), e);
                ControlFlow::Continue(())
            }
        }
    }

    /// Let the strategy react to the current round
    async fn trade_round(&mut self) {
        let player = self.client.player().await;
        let market = self.client.market().await;
        let ctx = StrategyContext {
            round: market.round_number,
            player: &player,
            market: &market,
        };

        let actions = self.strategy.on_round(&ctx).await;
        self.process_actions(actions).await;
    }

    /// Execute strategy actions through the client
    async fn process_actions(&mut self, actions: Vec<Action>) {
        for action in actions {
            let result = match &action {
                Action::Submit(order) => self.client.trade(order.clone()).await.map(|_| (1, 0)),
                Action::BuyAll => self
                    .client
                    .buy_all()
                    .await
                    .map(|o| (o.trades.len(), o.skipped.len())),
                Action::BuySelected(assets) => self
                    .client
                    .buy_selected(assets)
                    .await
                    .map(|o| (o.trades.len(), o.skipped.len())),
                Action::SellAll => self
                    .client
                    .sell_all()
                    .await
                    .map(|o| (o.trades.len(), o.skipped.len())),
            };

            match result {
                Ok((filled, skipped)) => {
                    self.report.trades += filled as u64;
                    self.report.skipped += skipped as u64;
                }
                Err(e) => {
                    debug!("[{}] {:?} refused: {}", self.student_id(), action, e);
                    self.report.rejected += 1;
                }
            }
        }
    }
}
