//! Trade execution
//!
//! Executes buy and sell orders against a player's state at the current
//! market prices. Every operation is pure: it takes the player by
//! reference and returns the next state, so a rejected trade leaves
//! nothing behind.

use std::sync::Arc;

use log::debug;
use odyssey_core::{AssetId, EPSILON, MarketState, PlayerState, Price, Trade, TradeAction};
use odyssey_ports::Clock;

use crate::error::{Result, TradeError};
use crate::order::{OrderSize, TradeOrder};

/// Result of a single executed trade
#[derive(Debug, Clone, PartialEq)]
pub struct TradeOutcome {
    pub player: PlayerState,
    pub trade: Trade,
}

/// Result of a bulk order: every trade that went through plus the assets skipped
#[derive(Debug, Clone, PartialEq)]
pub struct BulkOutcome {
    pub player: PlayerState,
    pub trades: Vec<Trade>,
    pub skipped: Vec<(AssetId, TradeError)>,
}

impl BulkOutcome {
    fn unchanged(player: &PlayerState) -> Self {
        Self {
            player: player.clone(),
            trades: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

pub struct TradeEngine {
    clock: Arc<dyn Clock>,
}

impl TradeEngine {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Execute one order; on error the player is untouched
    pub fn execute_trade(
        &self,
        player: &PlayerState,
        market: &MarketState,
        order: &TradeOrder,
    ) -> Result<TradeOutcome> {
        let mut next = player.clone();
        let trade = self.apply(&mut next, market, order)?;
        Ok(TradeOutcome {
            player: next,
            trade,
        })
    }

    /// Split all cash evenly over every asset
    pub fn buy_all(&self, player: &PlayerState, market: &MarketState) -> BulkOutcome {
        self.buy_selected(player, market, &AssetId::ALL)
    }

    /// Split all cash evenly over the chosen assets
    ///
    /// A skipped asset's share stays in cash.
    pub fn buy_selected(
        &self,
        player: &PlayerState,
        market: &MarketState,
        assets: &[AssetId],
    ) -> BulkOutcome {
        let mut selected = assets.to_vec();
        selected.sort();
        selected.dedup();

        if selected.is_empty() || player.cash < EPSILON {
            return BulkOutcome::unchanged(player);
        }

        let share = player.cash / selected.len() as f64;
        let orders = selected
            .into_iter()
            .map(|asset| TradeOrder::buy(asset, OrderSize::Amount(share)));
        self.apply_all(player, market, orders)
    }

    /// Liquidate every holding
    pub fn sell_all(&self, player: &PlayerState, market: &MarketState) -> BulkOutcome {
        let orders: Vec<TradeOrder> = player
            .portfolio
            .iter()
            .map(|(asset, quantity)| TradeOrder::sell(*asset, OrderSize::Quantity(*quantity)))
            .collect();
        self.apply_all(player, market, orders)
    }

    fn apply_all(
        &self,
        player: &PlayerState,
        market: &MarketState,
        orders: impl IntoIterator<Item = TradeOrder>,
    ) -> BulkOutcome {
        let mut outcome = BulkOutcome::unchanged(player);
        for order in orders {
            match self.apply(&mut outcome.player, market, &order) {
                Ok(trade) => outcome.trades.push(trade),
                Err(e) => {
                    debug!("Skipping {} {}: {}", order.action, order.asset, e);
                    outcome.skipped.push((order.asset, e));
                }
            }
        }
        outcome
    }

    /// Validate then mutate; nothing is written unless every check passes
    fn apply(
        &self,
        player: &mut PlayerState,
        market: &MarketState,
        order: &TradeOrder,
    ) -> Result<Trade> {
        let size = order.size.value();
        if !size.is_finite() || size <= 0.0 {
            return Err(TradeError::InvalidOrder(format!(
                "size must be positive, got {size}"
            )));
        }

        let asset = order.asset;
        let price = current_price(market, asset)?;

        if let Some(quote) = order.quote {
            let moved = (quote.price - price).abs() > EPSILON;
            if quote.round != market.round_number || moved {
                return Err(TradeError::StalePrice {
                    asset,
                    quoted: quote.price,
                    quoted_round: quote.round,
                    current: price,
                    current_round: market.round_number,
                });
            }
        }

        let (mut quantity, mut amount) = order.size.resolve(price);

        match order.action {
            TradeAction::Buy => {
                if amount > player.cash + EPSILON {
                    return Err(TradeError::InsufficientFunds {
                        required: amount,
                        available: player.cash,
                    });
                }
                if amount > player.cash {
                    amount = player.cash;
                    quantity = amount / price;
                }
                // Holdings this small are dropped, so the cash would vanish
                let held = player.holdings(asset);
                if held + quantity < EPSILON {
                    return Err(TradeError::InvalidOrder(format!(
                        "{quantity} {asset} is below the smallest holding"
                    )));
                }
                player.cash = (player.cash - amount).max(0.0);
                if player.cash < EPSILON {
                    player.cash = 0.0;
                }
                player.set_holdings(asset, held + quantity);
            }
            TradeAction::Sell => {
                let held = player.holdings(asset);
                if held < EPSILON {
                    return Err(TradeError::InvalidOrder(format!("no {asset} to sell")));
                }
                if quantity > held + EPSILON {
                    return Err(TradeError::InsufficientHoldings {
                        asset,
                        required: quantity,
                        available: held,
                    });
                }
                if held - quantity < EPSILON {
                    quantity = held;
                    amount = quantity * price;
                }
                player.cash += amount;
                player.set_holdings(asset, held - quantity);
            }
        }

        let trade = Trade::new(
            asset,
            order.action,
            quantity,
            price,
            market.round_number,
            self.clock.now(),
        );
        debug!(
            "{} {:.6} {} @ {:.2} in round {}",
            trade.action, trade.quantity, trade.asset, trade.price, trade.round
        );
        player.trade_history.push(trade.clone());
        Ok(trade)
    }
}

fn current_price(market: &MarketState, asset: AssetId) -> Result<Price> {
    match market.price(asset) {
        Some(price) if price.is_finite() && price > 0.0 => Ok(price),
        _ => Err(TradeError::PriceUnavailable(asset)),
    }
}
