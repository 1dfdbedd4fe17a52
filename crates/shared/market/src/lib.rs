//! Odyssey Market
//!
//! Everything that moves prices between rounds:
//!
//! ```text
//!   rng ──► independent normals z[0..6]
//!              │
//!              ▼
//!   ReturnGenerator ── correlation matrix, bounds, Bitcoin regimes
//!              │ returns
//!              ▼
//!   MarketEngine::advance ── new prices (floored), histories, CPI
//!              │
//!              ▼
//!         MarketState (round + 1)
//! ```
//!
//! Randomness is always passed in as a `rand::Rng`, so seeded runs are
//! fully reproducible.

pub mod cpi;
pub mod engine;
pub mod injection;
pub mod model;
pub mod normal;
pub mod returns;
pub mod stats;

pub use cpi::CpiModel;
pub use engine::{MarketConfig, MarketEngine};
pub use injection::CashInjectionConfig;
pub use model::{BitcoinRegime, CORRELATION, MarketModel, ReturnProfile, default_profile};
pub use returns::{BitcoinDraw, BitcoinRegimeKind, ReturnGenerator, RoundReturns};
pub use stats::{AssetPerformance, asset_performance, round_returns_pct};
