use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::AssetId;
use crate::values::{Amount, Price};

/// CPI level at round 0
pub const INITIAL_CPI: f64 = 100.0;

/// Bitcoin boom/bust cycle bookkeeping carried from round to round
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BitcoinCycle {
    /// Round in which the last forced crash happened
    pub last_crash_round: u32,
    /// Interval the next forced crash return is drawn from, as (start, end)
    pub shock_range: (f64, f64),
}

impl Default for BitcoinCycle {
    fn default() -> Self {
        Self {
            last_crash_round: 0,
            shock_range: (-0.5, -0.75),
        }
    }
}

/// Prices, price history and CPI for one round of a session
///
/// One record per round is authoritative (written by the instructor);
/// each student keeps a local copy overlaid from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketState {
    pub round_number: u32,
    pub asset_prices: BTreeMap<AssetId, Price>,
    /// One entry per round, round 0 included
    pub price_history: BTreeMap<AssetId, Vec<Price>>,
    pub cpi: f64,
    pub cpi_history: Vec<f64>,
    pub last_cash_injection: Amount,
    pub total_cash_injected: Amount,
    pub bitcoin_cycle: BitcoinCycle,
}

impl MarketState {
    /// Round 0 market with the fixed opening prices
    pub fn initial() -> Self {
        let asset_prices: BTreeMap<_, _> = AssetId::ALL
            .into_iter()
            .map(|asset| (asset, asset.initial_price()))
            .collect();
        let price_history = asset_prices
            .iter()
            .map(|(asset, price)| (*asset, vec![*price]))
            .collect();

        Self {
            round_number: 0,
            asset_prices,
            price_history,
            cpi: INITIAL_CPI,
            cpi_history: vec![INITIAL_CPI],
            last_cash_injection: 0.0,
            total_cash_injected: 0.0,
            bitcoin_cycle: BitcoinCycle::default(),
        }
    }

    /// Current price of an asset, if quoted
    pub fn price(&self, asset: AssetId) -> Option<Price> {
        self.asset_prices.get(&asset).copied()
    }

    /// Price of an asset at the end of a past round
    pub fn historical_price(&self, asset: AssetId, round: u32) -> Option<Price> {
        self.price_history
            .get(&asset)
            .and_then(|history| history.get(round as usize))
            .copied()
    }

    /// Whether every history has exactly one entry per round so far
    pub fn history_is_consistent(&self) -> bool {
        let expected = self.round_number as usize + 1;
        self.cpi_history.len() == expected
            && AssetId::ALL.iter().all(|asset| {
                self.price_history
                    .get(asset)
                    .is_some_and(|history| history.len() == expected)
            })
    }

    /// Replace the market-owned fields with a snapshot of the authoritative record
    ///
    /// Cash-injection bookkeeping is player-side and is left untouched.
    pub fn overlay_from(&mut self, authoritative: &MarketState) {
        self.round_number = authoritative.round_number;
        self.asset_prices = authoritative.asset_prices.clone();
        self.price_history = authoritative.price_history.clone();
        self.cpi = authoritative.cpi;
        self.cpi_history = authoritative.cpi_history.clone();
        self.bitcoin_cycle = authoritative.bitcoin_cycle;
    }

    /// Record a cash injection credited to the owning player
    pub fn record_cash_injection(&mut self, amount: Amount) {
        self.last_cash_injection = amount;
        self.total_cash_injected += amount;
    }
}

impl Default for MarketState {
    fn default() -> Self {
        Self::initial()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_market() {
        let market = MarketState::initial();
        assert_eq!(market.round_number, 0);
        assert_eq!(market.price(AssetId::Bitcoin), Some(50_000.0));
        assert_eq!(market.price(AssetId::RealEstate), Some(5_000.0));
        assert_eq!(market.cpi, 100.0);
        assert!(market.history_is_consistent());
        assert_eq!(market.bitcoin_cycle.shock_range, (-0.5, -0.75));
    }

    #[test]
    fn test_overlay_keeps_injection_fields() {
        let mut local = MarketState::initial();
        local.record_cash_injection(5_300.0);

        let mut remote = MarketState::initial();
        remote.round_number = 1;
        remote.asset_prices.insert(AssetId::Sp500, 110.0);
        for history in remote.price_history.values_mut() {
            let last = *history.last().unwrap();
            history.push(last);
        }
        remote.cpi = 102.0;
        remote.cpi_history.push(102.0);

        local.overlay_from(&remote);

        assert_eq!(local.round_number, 1);
        assert_eq!(local.price(AssetId::Sp500), Some(110.0));
        assert_eq!(local.cpi, 102.0);
        assert_eq!(local.total_cash_injected, 5_300.0);
        assert!(local.history_is_consistent());

        // Snapshot, not shared: later edits to the source do not leak in
        remote.asset_prices.insert(AssetId::Sp500, 1.0);
        assert_eq!(local.price(AssetId::Sp500), Some(110.0));
    }

    #[test]
    fn test_historical_price() {
        let market = MarketState::initial();
        assert_eq!(market.historical_price(AssetId::Gold, 0), Some(3_000.0));
        assert_eq!(market.historical_price(AssetId::Gold, 1), None);
    }
}
