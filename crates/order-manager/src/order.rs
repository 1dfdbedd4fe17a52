//! Orders as entered by a player
//!
//! A trade can be sized in dollars or in units; the two are tied together
//! by `amount = quantity * price` at the execution price.

use odyssey_core::{Amount, AssetId, MarketState, PlayerState, Price, Quantity, TradeAction};
use serde::{Deserialize, Serialize};

/// Trade size, in dollars or in units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum OrderSize {
    Amount(Amount),
    Quantity(Quantity),
}

impl OrderSize {
    /// Percentage of available cash, for buys
    pub fn percent_of_cash(player: &PlayerState, percent: f64) -> Self {
        OrderSize::Amount(player.cash * percent.clamp(0.0, 100.0) / 100.0)
    }

    /// Percentage of current holdings, for sells
    pub fn percent_of_holdings(player: &PlayerState, asset: AssetId, percent: f64) -> Self {
        OrderSize::Quantity(player.holdings(asset) * percent.clamp(0.0, 100.0) / 100.0)
    }

    /// Raw number, whichever unit it is in
    pub fn value(&self) -> f64 {
        match self {
            OrderSize::Amount(amount) => *amount,
            OrderSize::Quantity(quantity) => *quantity,
        }
    }

    /// Both views at a given price, as `(quantity, amount)`
    pub fn resolve(&self, price: Price) -> (Quantity, Amount) {
        match self {
            OrderSize::Amount(amount) => (amount / price, *amount),
            OrderSize::Quantity(quantity) => (*quantity, quantity * price),
        }
    }
}

/// Price and round an order was entered against
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub price: Price,
    pub round: u32,
}

/// A single buy or sell request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeOrder {
    pub action: TradeAction,
    pub asset: AssetId,
    pub size: OrderSize,
    /// When present, execution is refused if the market has moved since
    pub quote: Option<Quote>,
}

impl TradeOrder {
    pub fn new(action: TradeAction, asset: AssetId, size: OrderSize) -> Self {
        Self {
            action,
            asset,
            size,
            quote: None,
        }
    }

    pub fn buy(asset: AssetId, size: OrderSize) -> Self {
        Self::new(TradeAction::Buy, asset, size)
    }

    pub fn sell(asset: AssetId, size: OrderSize) -> Self {
        Self::new(TradeAction::Sell, asset, size)
    }

    /// Pin the order to an explicit price and round
    pub fn with_quote(mut self, price: Price, round: u32) -> Self {
        self.quote = Some(Quote { price, round });
        self
    }

    /// Pin the order to the price the player is currently looking at
    pub fn quoted_from(mut self, market: &MarketState) -> Self {
        self.quote = market.price(self.asset).map(|price| Quote {
            price,
            round: market.round_number,
        });
        self
    }
}
