use odyssey_core::{
    Amount, MarketState, PlayerState, SectionId, SessionId, StudentId, Timestamp,
};
use odyssey_market::{AssetPerformance, asset_performance};
use odyssey_order_manager::PortfolioSummary;
use odyssey_ports::LeaderboardEntry;
use serde::{Deserialize, Serialize};

/// What a single reconciliation poll did
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    /// Nothing new since the last poll
    Unchanged,
    /// Local state caught up from round `from` to round `to`
    Advanced { from: u32, to: u32, injected: Amount },
    /// The session completed; reported once
    GameOver(GameSummary),
    /// The session is gone and the client generates its own market
    Offline,
}

/// End-of-game screen for one student
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSummary {
    pub session_id: SessionId,
    pub student_id: StudentId,
    pub final_round: u32,
    pub final_cpi: f64,
    pub portfolio: PortfolioSummary,
    pub assets: Vec<AssetPerformance>,
}

impl GameSummary {
    pub fn new(
        session_id: SessionId,
        student_id: impl Into<StudentId>,
        player: &PlayerState,
        market: &MarketState,
    ) -> Self {
        Self {
            session_id,
            student_id: student_id.into(),
            final_round: market.round_number,
            final_cpi: market.cpi,
            portfolio: PortfolioSummary::new(player, market),
            assets: asset_performance(market),
        }
    }

    /// The leaderboard row matching this summary
    pub fn leaderboard_entry(
        &self,
        section_id: SectionId,
        recorded_at: Timestamp,
    ) -> LeaderboardEntry {
        LeaderboardEntry {
            session_id: self.session_id,
            section_id,
            student_id: self.student_id.clone(),
            final_value: self.portfolio.total_value,
            total_cash_injected: self.portfolio.total_cash_injected,
            adjusted_return_pct: self.portfolio.adjusted_return_pct,
            recorded_at,
        }
    }
}
