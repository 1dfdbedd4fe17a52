use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{AssetId, MarketState, Trade};
use crate::values::{Amount, EPSILON, Price, Quantity, STARTING_CASH};

/// A single participant's private portfolio
///
/// Only the owning student mutates it: through its own trades and
/// through the cash injections applied when a round advances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub cash: Amount,
    /// Holdings per asset; entries below `EPSILON` are removed
    pub portfolio: BTreeMap<AssetId, Quantity>,
    pub trade_history: Vec<Trade>,
    /// Total value at the end of each round, round 0 included
    pub portfolio_value_history: Vec<Amount>,
    /// Cash injection credited per round
    pub cash_injections: BTreeMap<u32, Amount>,
}

impl PlayerState {
    /// Fresh player with the starting cash and nothing else
    pub fn new() -> Self {
        Self::with_cash(STARTING_CASH)
    }

    pub fn with_cash(cash: Amount) -> Self {
        Self {
            cash,
            portfolio: BTreeMap::new(),
            trade_history: Vec::new(),
            portfolio_value_history: vec![cash],
            cash_injections: BTreeMap::new(),
        }
    }

    /// Units held of an asset (zero when absent)
    pub fn holdings(&self, asset: AssetId) -> Quantity {
        self.portfolio.get(&asset).copied().unwrap_or(0.0)
    }

    /// Set holdings of an asset, dropping dust positions
    pub fn set_holdings(&mut self, asset: AssetId, quantity: Quantity) {
        if quantity < EPSILON {
            self.portfolio.remove(&asset);
        } else {
            self.portfolio.insert(asset, quantity);
        }
    }

    /// Value of all holdings at the given prices; unpriced assets count as zero
    pub fn holdings_value_with<F>(&self, price_of: F) -> Amount
    where
        F: Fn(AssetId) -> Option<Price>,
    {
        self.portfolio
            .iter()
            .map(|(asset, quantity)| quantity * price_of(*asset).unwrap_or(0.0))
            .sum()
    }

    /// Value of all holdings at the market's current prices
    pub fn holdings_value(&self, market: &MarketState) -> Amount {
        self.holdings_value_with(|asset| market.price(asset))
    }

    /// Cash plus holdings at the market's current prices
    pub fn total_value(&self, market: &MarketState) -> Amount {
        self.cash + self.holdings_value(market)
    }

    /// Whether an injection for this round has already been credited
    pub fn has_injection_for(&self, round: u32) -> bool {
        self.cash_injections.contains_key(&round)
    }

    /// Credit a round's cash injection once; returns false if already credited
    pub fn apply_cash_injection(&mut self, round: u32, amount: Amount) -> bool {
        if self.has_injection_for(round) {
            return false;
        }
        self.cash += amount;
        self.cash_injections.insert(round, amount);
        true
    }

    /// Sum of all injections credited so far
    pub fn total_cash_injected(&self) -> Amount {
        self.cash_injections.values().fold(0.0, |total, amount| total + amount)
    }

    /// Record the end-of-round value, overwriting a previous entry for the same round
    pub fn record_round_value(&mut self, round: u32, value: Amount) {
        let index = round as usize;
        if index < self.portfolio_value_history.len() {
            self.portfolio_value_history[index] = value;
            self.portfolio_value_history.truncate(index + 1);
        } else {
            let last = self.portfolio_value_history.last().copied().unwrap_or(value);
            self.portfolio_value_history.resize(index, last);
            self.portfolio_value_history.push(value);
        }
    }

    /// Most recently recorded end-of-round value
    pub fn latest_recorded_value(&self) -> Amount {
        self.portfolio_value_history
            .last()
            .copied()
            .unwrap_or(self.cash)
    }
}

impl Default for PlayerState {
    fn default() -> Self {
        Self::new()
    }
}
