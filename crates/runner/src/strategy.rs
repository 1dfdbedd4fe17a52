//! Student strategies
//!
//! A strategy looks at the student's portfolio once per round and answers
//! with a list of actions. Strategies never touch the store; the agent
//! runner executes the actions through the student client.

use async_trait::async_trait;
use odyssey_core::{AssetId, MarketState, PlayerState};
use odyssey_market::round_returns_pct;
use odyssey_order_manager::{OrderSize, TradeOrder};
use odyssey_session::GameSummary;
use serde::{Deserialize, Serialize};

/// Read-only view handed to a strategy each round
pub struct StrategyContext<'a> {
    pub round: u32,
    pub player: &'a PlayerState,
    pub market: &'a MarketState,
}

/// What a strategy wants done
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// A single order, usually quoted from the context's market
    Submit(TradeOrder),
    /// Spread all cash evenly across every asset
    BuyAll,
    /// Spread all cash evenly across the given assets
    BuySelected(Vec<AssetId>),
    /// Liquidate every holding
    SellAll,
}

/// Strategy trait - implement this for a simulated student
#[async_trait]
pub trait StudentStrategy: Send {
    /// Strategy name for logging
    fn name(&self) -> &str;

    /// Called once per round the student sees, round 0 included
    async fn on_round(&mut self, ctx: &StrategyContext<'_>) -> Vec<Action>;

    /// Called when the game is over (optional)
    async fn on_game_over(&mut self, _summary: &GameSummary) {}
}

/// Strategy selection as it appears in classroom config files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StrategyKind {
    BuyAndHold,
    Rebalancer { every: u32 },
    Momentum { top: usize },
    CashHolder,
}

impl StrategyKind {
    pub fn build(&self) -> Box<dyn StudentStrategy> {
        match self {
            StrategyKind::BuyAndHold => Box::new(BuyAndHold),
            StrategyKind::Rebalancer { every } => Box::new(Rebalancer::new(*every)),
            StrategyKind::Momentum { top } => Box::new(Momentum::new(*top)),
            StrategyKind::CashHolder => Box::new(CashHolder),
        }
    }
}

/// Puts every dollar to work across all assets and never sells
#[derive(Debug, Clone, Copy, Default)]
pub struct BuyAndHold;

#[async_trait]
impl StudentStrategy for BuyAndHold {
    fn name(&self) -> &str {
        "buy-and-hold"
    }

    async fn on_round(&mut self, ctx: &StrategyContext<'_>) -> Vec<Action> {
        if ctx.player.cash > 0.0 {
            vec![Action::BuyAll]
        } else {
            Vec::new()
        }
    }
}

/// Liquidates and re-spreads evenly every `every` rounds
///
/// Between rebalances new cash is left idle.
#[derive(Debug, Clone, Copy)]
pub struct Rebalancer {
    every: u32,
}

impl Rebalancer {
    pub fn new(every: u32) -> Self {
        Self {
            every: every.max(1),
        }
    }
}

#[async_trait]
impl StudentStrategy for Rebalancer {
    fn name(&self) -> &str {
        "rebalancer"
    }

    async fn on_round(&mut self, ctx: &StrategyContext<'_>) -> Vec<Action> {
        if ctx.round % self.every != 0 {
            return Vec::new();
        }
        if ctx.player.portfolio.is_empty() {
            vec![Action::BuyAll]
        } else {
            vec![Action::SellAll, Action::BuyAll]
        }
    }
}

/// Chases last round's best performers
///
/// Sells whatever dropped out of the top `top` assets, then spreads cash
/// over the winners. Before any round has closed it behaves like
/// [`BuyAndHold`].
#[derive(Debug, Clone, Copy)]
pub struct Momentum {
    top: usize,
}

impl Momentum {
    pub fn new(top: usize) -> Self {
        Self {
            top: top.clamp(1, AssetId::COUNT),
        }
    }

    /// Assets ranked by their latest round return, best first
    fn leaders(&self, market: &MarketState) -> Vec<AssetId> {
        let mut ranked: Vec<(AssetId, f64)> = AssetId::ALL
            .into_iter()
            .filter_map(|asset| {
                let history = market.price_history.get(&asset)?;
                let last = *round_returns_pct(history).last()?;
                Some((asset, last))
            })
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
            .into_iter()
            .take(self.top)
            .map(|(asset, _)| asset)
            .collect()
    }
}

#[async_trait]
impl StudentStrategy for Momentum {
    fn name(&self) -> &str {
        "momentum"
    }

    async fn on_round(&mut self, ctx: &StrategyContext<'_>) -> Vec<Action> {
        let leaders = self.leaders(ctx.market);
        if leaders.is_empty() {
            return vec![Action::BuyAll];
        }

        let mut actions: Vec<Action> = ctx
            .player
            .portfolio
            .keys()
            .filter(|asset| !leaders.contains(asset))
            .map(|asset| {
                let size = OrderSize::percent_of_holdings(ctx.player, *asset, 100.0);
                Action::Submit(TradeOrder::sell(*asset, size).quoted_from(ctx.market))
            })
            .collect();
        actions.push(Action::BuySelected(leaders));
        actions
    }
}

/// Never trades; the benchmark everyone else is compared against
#[derive(Debug, Clone, Copy, Default)]
pub struct CashHolder;

#[async_trait]
impl StudentStrategy for CashHolder {
    fn name(&self) -> &str {
        "cash-holder"
    }

    async fn on_round(&mut self, _ctx: &StrategyContext<'_>) -> Vec<Action> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use odyssey_core::TradeAction;

    fn market_after_one_round() -> MarketState {
        let mut market = MarketState::initial();
        market.round_number = 1;
        for asset in AssetId::ALL {
            let history = market.price_history.entry(asset).or_default();
            let start = history[0];
            // Bitcoin gains most, S&P 500 second, the rest are flat
            let next = match asset {
                AssetId::Bitcoin => start * 1.5,
                AssetId::Sp500 => start * 1.1,
                _ => start,
            };
            history.push(next);
            market.asset_prices.insert(asset, next);
        }
        market.cpi_history.push(market.cpi);
        market
    }

    #[tokio::test]
    async fn test_buy_and_hold_invests_cash() {
        let player = PlayerState::new();
        let market = MarketState::initial();
        let ctx = StrategyContext {
            round: 0,
            player: &player,
            market: &market,
        };

        assert_eq!(BuyAndHold.on_round(&ctx).await, vec![Action::BuyAll]);
    }

    #[tokio::test]
    async fn test_rebalancer_cadence() {
        let mut player = PlayerState::new();
        player.set_holdings(AssetId::Gold, 3.0);
        let market = MarketState::initial();
        let mut strategy = Rebalancer::new(3);

        for round in 0..=6 {
            let ctx = StrategyContext {
                round,
                player: &player,
                market: &market,
            };
            let actions = strategy.on_round(&ctx).await;
            if round % 3 == 0 {
                assert_eq!(actions, vec![Action::SellAll, Action::BuyAll]);
            } else {
                assert!(actions.is_empty());
            }
        }
    }

    #[tokio::test]
    async fn test_momentum_rotates_into_leaders() {
        let market = market_after_one_round();
        let mut player = PlayerState::new();
        player.set_holdings(AssetId::Gold, 10.0);
        player.set_holdings(AssetId::Bitcoin, 0.01);
        let ctx = StrategyContext {
            round: 1,
            player: &player,
            market: &market,
        };

        let actions = Momentum::new(2).on_round(&ctx).await;

        assert_eq!(actions.len(), 2);
        let Action::Submit(order) = &actions[0] else {
            panic!("expected a sell order, got {:?}", actions[0]);
        };
        assert_eq!(order.action, TradeAction::Sell);
        assert_eq!(order.asset, AssetId::Gold);
        assert_eq!(order.size, OrderSize::Quantity(10.0));
        assert!(order.quote.is_some());
        assert_eq!(
            actions[1],
            Action::BuySelected(vec![AssetId::Bitcoin, AssetId::Sp500])
        );
    }

    #[tokio::test]
    async fn test_momentum_without_history_buys_everything() {
        let player = PlayerState::new();
        let market = MarketState::initial();
        let ctx = StrategyContext {
            round: 0,
            player: &player,
            market: &market,
        };

        assert_eq!(Momentum::new(2).on_round(&ctx).await, vec![Action::BuyAll]);
    }

    #[test]
    fn test_strategy_kind_from_json() {
        let kinds: Vec<StrategyKind> = serde_json::from_str(
            r#"[{"type":"buy_and_hold"},{"type":"rebalancer","every":4},{"type":"momentum","top":2},{"type":"cash_holder"}]"#,
        )
        .unwrap();

        assert_eq!(kinds[1], StrategyKind::Rebalancer { every: 4 });
        let names: Vec<String> = kinds.iter().map(|k| k.build().name().to_string()).collect();
        assert_eq!(
            names,
            ["buy-and-hold", "rebalancer", "momentum", "cash-holder"]
        );
    }
}
