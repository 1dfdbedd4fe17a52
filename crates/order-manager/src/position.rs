//! Portfolio valuation
//!
//! Values are recomputed on demand from the player's holdings and the
//! market's current prices; nothing here is cached in player state.

use odyssey_core::{Amount, AssetId, MarketState, PlayerState, Price, Quantity, STARTING_CASH};
use serde::{Deserialize, Serialize};

/// One holding valued at the current price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionValue {
    pub asset: AssetId,
    pub quantity: Quantity,
    /// Zero when the market has no price for the asset
    pub price: Price,
    pub value: Amount,
    /// Share of total portfolio value, in percent
    pub weight_pct: f64,
}

/// Per-asset breakdown of a portfolio
pub fn positions(player: &PlayerState, market: &MarketState) -> Vec<PositionValue> {
    let total = player.total_value(market);
    player
        .portfolio
        .iter()
        .map(|(asset, quantity)| {
            let price = market.price(*asset).unwrap_or(0.0);
            let value = quantity * price;
            PositionValue {
                asset: *asset,
                quantity: *quantity,
                price,
                value,
                weight_pct: if total > 0.0 { value / total * 100.0 } else { 0.0 },
            }
        })
        .collect()
}

/// Game-over statistics for one player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub total_value: Amount,
    pub cash: Amount,
    pub holdings_value: Amount,
    pub total_cash_injected: Amount,
    /// Starting cash plus every injection received
    pub total_investment: Amount,
    /// Return on total investment, in percent
    pub adjusted_return_pct: f64,
}

impl PortfolioSummary {
    pub fn new(player: &PlayerState, market: &MarketState) -> Self {
        let holdings_value = player.holdings_value(market);
        let total_value = player.cash + holdings_value;
        let total_cash_injected = player.total_cash_injected();
        let total_investment = STARTING_CASH + total_cash_injected;

        Self {
            total_value,
            cash: player.cash,
            holdings_value,
            total_cash_injected,
            total_investment,
            adjusted_return_pct: (total_value - total_investment) / total_investment * 100.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_summary_counts_injections_as_investment() {
        let mut market = MarketState::initial();
        market.asset_prices.insert(AssetId::Sp500, 110.0);

        let mut player = PlayerState::with_cash(5_000.0);
        player.set_holdings(AssetId::Sp500, 50.0);
        player.apply_cash_injection(1, 5_300.0);

        let summary = PortfolioSummary::new(&player, &market);
        assert_relative_eq!(summary.total_value, 15_800.0);
        assert_relative_eq!(summary.holdings_value, 5_500.0);
        assert_relative_eq!(summary.total_investment, 15_300.0);
        assert_relative_eq!(summary.adjusted_return_pct, 500.0 / 15_300.0 * 100.0);
    }

    #[test]
    fn test_summary_without_injections_prints_zero() {
        let summary = PortfolioSummary::new(&PlayerState::new(), &MarketState::initial());
        assert!(summary.total_cash_injected.is_sign_positive());
        assert_eq!(format!("{:.2}", summary.total_cash_injected), "0.00");
        assert_eq!(summary.adjusted_return_pct, 0.0);
    }

    #[test]
    fn test_position_weights() {
        let market = MarketState::initial();
        let mut player = PlayerState::with_cash(5_000.0);
        player.set_holdings(AssetId::Sp500, 50.0);

        let breakdown = positions(&player, &market);
        assert_eq!(breakdown.len(), 1);
        assert_relative_eq!(breakdown[0].value, 5_000.0);
        assert_relative_eq!(breakdown[0].weight_pct, 50.0);
    }
}
