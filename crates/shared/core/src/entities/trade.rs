use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AssetId;
use crate::values::{Amount, Price, Quantity};

/// Unique identifier for a trade
pub type TradeId = Uuid;

/// Direction of a trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradeAction {
    Buy,
    Sell,
}

impl std::fmt::Display for TradeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeAction::Buy => write!(f, "buy"),
            TradeAction::Sell => write!(f, "sell"),
        }
    }
}

/// An executed trade, appended to a player's history and never modified
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: TradeId,
    pub asset: AssetId,
    pub action: TradeAction,
    pub quantity: Quantity,
    pub price: Price,
    /// Cash paid (buy) or received (sell); always `quantity * price`
    pub total_amount: Amount,
    /// Round the trade executed in
    pub round: u32,
    pub timestamp: DateTime<Utc>,
}

impl Trade {
    /// Create a trade with explicit timestamp
    pub fn new(
        asset: AssetId,
        action: TradeAction,
        quantity: Quantity,
        price: Price,
        round: u32,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            asset,
            action,
            quantity,
            price,
            total_amount: quantity * price,
            round,
            timestamp,
        }
    }

    /// Cash delta this trade applied to the player (negative for buys)
    pub fn cash_delta(&self) -> Amount {
        match self.action {
            TradeAction::Buy => -self.total_amount,
            TradeAction::Sell => self.total_amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_amount_matches_quantity_times_price() {
        let trade = Trade::new(AssetId::Gold, TradeAction::Buy, 2.5, 3_000.0, 1, Utc::now());
        assert_eq!(trade.total_amount, 7_500.0);
        assert_eq!(trade.cash_delta(), -7_500.0);
    }

    #[test]
    fn test_sell_credits_cash() {
        let trade = Trade::new(AssetId::Bonds, TradeAction::Sell, 10.0, 101.0, 3, Utc::now());
        assert_eq!(trade.cash_delta(), 1_010.0);
    }
}
