//! Odyssey Order Manager
//!
//! The trade engine a student's client runs locally:
//! - **Order sizing**: dollar amounts, unit quantities, or percentages of cash/holdings
//! - **Execution**: validates and applies buys and sells, all-or-nothing
//! - **Bulk orders**: buy all, buy selected, sell all
//! - **Valuation**: total value, position breakdown, game-over summary
//!
//! ## Flow
//!
//! ```text
//! TradeOrder ──► TradeEngine::execute_trade(player, market, order)
//!                    │
//!                    ├── size valid?        ── no ──► InvalidOrder
//!                    ├── price usable?      ── no ──► PriceUnavailable
//!                    ├── quote still fresh? ── no ──► StalePrice
//!                    ├── cash / holdings?   ── no ──► InsufficientFunds / InsufficientHoldings
//!                    ▼
//!              TradeOutcome { next player state, trade }
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use odyssey_order_manager::{OrderSize, TradeEngine, TradeOrder};
//!
//! let engine = TradeEngine::new(clock);
//! let order = TradeOrder::buy(AssetId::Sp500, OrderSize::Amount(5_000.0)).quoted_from(&market);
//! let outcome = engine.execute_trade(&player, &market, &order)?;
//! ```

pub mod engine;
pub mod error;
pub mod order;
pub mod position;

pub use engine::{BulkOutcome, TradeEngine, TradeOutcome};
pub use error::{Result, TradeError};
pub use order::{OrderSize, Quote, TradeOrder};
pub use position::{PortfolioSummary, PositionValue, positions};
