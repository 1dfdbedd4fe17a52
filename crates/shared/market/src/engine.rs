use odyssey_core::MarketState;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::cpi::CpiModel;
use crate::model::MarketModel;
use crate::returns::{ReturnGenerator, RoundReturns};

/// Configuration of the market side of a game
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    pub model: MarketModel,
    pub cpi: CpiModel,
}

/// Advances a market by one round: new prices from the generator, then CPI
#[derive(Debug, Clone, Default)]
pub struct MarketEngine {
    generator: ReturnGenerator,
    cpi: CpiModel,
}

impl MarketEngine {
    pub fn new(config: MarketConfig) -> Self {
        Self {
            generator: ReturnGenerator::new(config.model),
            cpi: config.cpi,
        }
    }

    pub fn generator(&self) -> &ReturnGenerator {
        &self.generator
    }

    /// Market for the round after `previous`
    ///
    /// Prices, histories, CPI and the Bitcoin cycle move forward; cash
    /// injection bookkeeping is carried over untouched.
    pub fn advance<R: Rng + ?Sized>(&self, previous: &MarketState, rng: &mut R) -> MarketState {
        let round = previous.round_number + 1;
        let outcome = self.generator.generate_round(previous, round, rng);
        let cpi = self.cpi.next(previous.cpi, rng);
        apply_round(previous, outcome, cpi)
    }
}

fn apply_round(previous: &MarketState, outcome: RoundReturns, cpi: f64) -> MarketState {
    let mut next = previous.clone();
    next.round_number = outcome.round;

    for (asset, price) in outcome.prices {
        next.asset_prices.insert(asset, price);
        next.price_history.entry(asset).or_default().push(price);
    }

    next.cpi = cpi;
    next.cpi_history.push(cpi);
    next.bitcoin_cycle = outcome.bitcoin_cycle;
    next
}
