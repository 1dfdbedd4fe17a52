//! Return Generator
//!
//! Produces one correlated return per asset per round. Non-Bitcoin assets
//! draw `mean + std_dev * w` where `w` mixes six independent normals through
//! the correlation matrix, clamped to the asset's bounds. Bitcoin is decided
//! by its current price level:
//!
//! ```text
//! price < 10k          growth regime   r ~ U(2.0, 4.0)
//! price >= 1M          crash regime    r ~ U(-0.5, -0.3)
//! otherwise            correlated normal
//!   price > 100k         damped volatility, re-scaled mean
//!   4+ rounds since      coin flip forces r into the shock range,
//!   last crash           which then decays toward (-0.05, -0.15)
//! ```
//!
//! A Bitcoin return landing within the bound margin of either bound is
//! re-rolled into a small window around that bound, then clamped.

use odyssey_core::{AssetId, BitcoinCycle, MarketState, Price};
use rand::Rng;
use std::collections::BTreeMap;

use crate::model::{BitcoinRegime, MarketModel};
use crate::normal::{independent_normals, standard_normal, uniform_between};

/// Which Bitcoin rule produced the round's return
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitcoinRegimeKind {
    Growth,
    Crash,
    Correlated,
    Damped,
    ForcedCrash,
}

/// Bitcoin's return for a round together with the updated cycle state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BitcoinDraw {
    pub value: f64,
    pub regime: BitcoinRegimeKind,
    pub cycle: BitcoinCycle,
}

/// Returns and resulting prices for one round
#[derive(Debug, Clone, PartialEq)]
pub struct RoundReturns {
    pub round: u32,
    pub returns: BTreeMap<AssetId, f64>,
    pub prices: BTreeMap<AssetId, Price>,
    pub bitcoin_regime: BitcoinRegimeKind,
    pub bitcoin_cycle: BitcoinCycle,
}

/// Stateless generator; all carried state lives in [`MarketState`]
#[derive(Debug, Clone, Default)]
pub struct ReturnGenerator {
    model: MarketModel,
}

impl ReturnGenerator {
    pub fn new(model: MarketModel) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &MarketModel {
        &self.model
    }

    /// Generate returns and prices for `round` starting from `market`'s prices
    pub fn generate_round<R: Rng + ?Sized>(
        &self,
        market: &MarketState,
        round: u32,
        rng: &mut R,
    ) -> RoundReturns {
        let z = independent_normals(rng);

        let bitcoin_price = self.previous_price(market, AssetId::Bitcoin);
        let bitcoin = self.bitcoin_return(bitcoin_price, round, &z, market.bitcoin_cycle, rng);

        let mut returns = BTreeMap::new();
        let mut prices = BTreeMap::new();
        for asset in AssetId::ALL {
            let r = match asset {
                AssetId::Bitcoin => bitcoin.value,
                _ => self.correlated_return(asset, &z),
            };
            let previous = self.previous_price(market, asset);
            let price = (previous * (1.0 + r)).max(asset.price_floor());

            log::debug!(
                "Round {}: {} {:.2} -> {:.2} (return {:.4})",
                round,
                asset,
                previous,
                price,
                r
            );

            returns.insert(asset, r);
            prices.insert(asset, price);
        }

        RoundReturns {
            round,
            returns,
            prices,
            bitcoin_regime: bitcoin.regime,
            bitcoin_cycle: bitcoin.cycle,
        }
    }

    /// Correlated, bounded return for a non-Bitcoin asset
    pub fn correlated_return(&self, asset: AssetId, z: &[f64; AssetId::COUNT]) -> f64 {
        let profile = self.model.profile(asset);
        profile.clamp(profile.mean + profile.std_dev * self.model.correlated(asset, z))
    }

    /// Bitcoin's return at a given price level
    pub fn bitcoin_return<R: Rng + ?Sized>(
        &self,
        price: Price,
        round: u32,
        z: &[f64; AssetId::COUNT],
        cycle: BitcoinCycle,
        rng: &mut R,
    ) -> BitcoinDraw {
        let regime = &self.model.bitcoin;
        let profile = self.model.profile(AssetId::Bitcoin);
        let mut cycle = cycle;

        let (raw, kind) = if price < regime.growth_below {
            let (low, high) = regime.growth_return;
            (uniform_between(rng, low, high), BitcoinRegimeKind::Growth)
        } else if price >= regime.crash_at {
            let (low, high) = regime.crash_return;
            (uniform_between(rng, low, high), BitcoinRegimeKind::Crash)
        } else {
            let mut r =
                profile.mean + profile.std_dev * self.model.correlated(AssetId::Bitcoin, z);
            let mut kind = BitcoinRegimeKind::Correlated;

            if price > regime.damping_above {
                let increments = (price - regime.damping_above) / regime.damping_step;
                let reduction = (increments * regime.damping_per_step).min(regime.damping_cap);
                let std_dev = profile.std_dev * (1.0 - reduction);
                let shock = standard_normal(rng);
                let mean = profile.mean * uniform_between(rng, 0.5, 1.0);
                r = mean + shock * std_dev;
                kind = BitcoinRegimeKind::Damped;
            }

            let due = round.saturating_sub(cycle.last_crash_round) >= regime.crash_cycle_rounds;
            if due && rng.r#gen::<f64>() < regime.crash_probability {
                let (start, end) = cycle.shock_range;
                r = uniform_between(rng, start, end);
                cycle = BitcoinCycle {
                    last_crash_round: round,
                    shock_range: decay_shock(regime, cycle.shock_range),
                };
                kind = BitcoinRegimeKind::ForcedCrash;
                log::info!("Bitcoin crash in round {} with return {:.2}", round, r);
            }

            (r, kind)
        };

        BitcoinDraw {
            value: self.bound_bitcoin(raw, rng),
            regime: kind,
            cycle,
        }
    }

    /// Keep Bitcoin inside its bounds without piling up exactly on them
    fn bound_bitcoin<R: Rng + ?Sized>(&self, r: f64, rng: &mut R) -> f64 {
        let regime = &self.model.bitcoin;
        let profile = self.model.profile(AssetId::Bitcoin);
        let window = regime.reroll_fraction;

        if r <= profile.min + regime.bound_margin {
            let rerolled = profile.min + uniform_between(rng, -window, window) * profile.min.abs();
            log::debug!("Bitcoin return {:.4} at minimum, re-rolled to {:.4}", r, rerolled);
            profile.clamp(rerolled)
        } else if r >= profile.max - regime.bound_margin {
            let rerolled = profile.max + uniform_between(rng, -window, window) * profile.max;
            log::debug!("Bitcoin return {:.4} at maximum, re-rolled to {:.4}", r, rerolled);
            profile.clamp(rerolled)
        } else {
            profile.clamp(r)
        }
    }

    fn previous_price(&self, market: &MarketState, asset: AssetId) -> Price {
        market.price(asset).unwrap_or_else(|| {
            log::warn!(
                "No price for {} in round {}, using initial price",
                asset,
                market.round_number
            );
            asset.initial_price()
        })
    }
}

fn decay_shock(regime: &BitcoinRegime, (start, end): (f64, f64)) -> (f64, f64) {
    (
        (start + regime.shock_decay)
            .max(regime.shock_floor.0)
            .min(regime.shock_ceiling.0),
        (end + regime.shock_decay)
            .max(regime.shock_floor.1)
            .min(regime.shock_ceiling.1),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn generator() -> ReturnGenerator {
        ReturnGenerator::default()
    }

    #[test]
    fn test_crash_regime_above_one_million() {
        let generator = generator();
        let mut rng = StdRng::seed_from_u64(11);

        for round in 1..500 {
            // Extreme correlation inputs must not matter in this regime
            let z = [if round % 2 == 0 { 8.0 } else { -8.0 }; AssetId::COUNT];
            let draw =
                generator.bitcoin_return(1_050_000.0, round, &z, BitcoinCycle::default(), &mut rng);
            assert_eq!(draw.regime, BitcoinRegimeKind::Crash);
            assert!((-0.5..=-0.3).contains(&draw.value), "return {}", draw.value);
        }
    }

    #[test]
    fn test_growth_regime_below_ten_thousand() {
        let generator = generator();
        let mut rng = StdRng::seed_from_u64(3);
        let z = [0.0; AssetId::COUNT];

        for _ in 0..500 {
            let draw = generator.bitcoin_return(5_000.0, 1, &z, BitcoinCycle::default(), &mut rng);
            assert_eq!(draw.regime, BitcoinRegimeKind::Growth);
            // Anything past the 2.5 cap is re-rolled just below it
            assert!((2.0..=2.5).contains(&draw.value), "return {}", draw.value);
        }
    }

    #[test]
    fn test_damped_regime_above_hundred_thousand() {
        let generator = generator();
        let mut rng = StdRng::seed_from_u64(5);
        let z = [0.0; AssetId::COUNT];

        // Round 1 with no prior crash: cycle not due, so no forced crash
        let draw = generator.bitcoin_return(400_000.0, 1, &z, BitcoinCycle::default(), &mut rng);
        assert_eq!(draw.regime, BitcoinRegimeKind::Damped);
        assert_eq!(draw.cycle, BitcoinCycle::default());
    }

    #[test]
    fn test_forced_crash_decays_shock_range() {
        let mut model = MarketModel::default();
        model.bitcoin.crash_probability = 1.0;
        let generator = ReturnGenerator::new(model);
        let mut rng = StdRng::seed_from_u64(9);
        let z = [0.0; AssetId::COUNT];

        let draw = generator.bitcoin_return(50_000.0, 4, &z, BitcoinCycle::default(), &mut rng);
        assert_eq!(draw.regime, BitcoinRegimeKind::ForcedCrash);
        assert_eq!(draw.cycle.last_crash_round, 4);
        assert!((draw.cycle.shock_range.0 - (-0.4)).abs() < 1e-12);
        assert!((draw.cycle.shock_range.1 - (-0.65)).abs() < 1e-12);
        assert!(draw.value <= -0.5 + 1e-12 && draw.value >= -0.73);

        // Not due again until four more rounds have passed
        let next = generator.bitcoin_return(50_000.0, 7, &z, draw.cycle, &mut rng);
        assert_ne!(next.regime, BitcoinRegimeKind::ForcedCrash);
    }

    #[test]
    fn test_shock_range_converges() {
        let regime = BitcoinRegime::default();
        let mut range = (-0.5, -0.75);
        for _ in 0..20 {
            range = decay_shock(&regime, range);
        }
        assert!((range.0 - (-0.05)).abs() < 1e-12);
        assert!((range.1 - (-0.15)).abs() < 1e-12);
    }

    #[test]
    fn test_all_returns_within_bounds() {
        let generator = generator();
        let mut rng = StdRng::seed_from_u64(2024);

        for bitcoin_price in [2_000.0, 50_000.0, 250_000.0, 900_000.0, 2_000_000.0] {
            let mut market = MarketState::initial();
            market.asset_prices.insert(AssetId::Bitcoin, bitcoin_price);

            for round in 1..300 {
                let outcome = generator.generate_round(&market, round, &mut rng);
                for (asset, r) in &outcome.returns {
                    let profile = generator.model().profile(*asset);
                    assert!(profile.contains(*r), "{asset} return {r} out of bounds");
                }
                for (asset, price) in &outcome.prices {
                    assert!(*price >= asset.price_floor());
                }
            }
        }
    }

    #[test]
    fn test_sp500_and_bonds_move_against_each_other() {
        let generator = generator();
        let mut rng = StdRng::seed_from_u64(77);
        let market = MarketState::initial();

        let samples: Vec<(f64, f64)> = (0..5_000)
            .map(|_| {
                let outcome = generator.generate_round(&market, 1, &mut rng);
                (outcome.returns[&AssetId::Sp500], outcome.returns[&AssetId::Bonds])
            })
            .collect();

        let n = samples.len() as f64;
        let mean_a = samples.iter().map(|s| s.0).sum::<f64>() / n;
        let mean_b = samples.iter().map(|s| s.1).sum::<f64>() / n;
        let cov = samples.iter().map(|s| (s.0 - mean_a) * (s.1 - mean_b)).sum::<f64>() / n;
        let var_a = samples.iter().map(|s| (s.0 - mean_a).powi(2)).sum::<f64>() / n;
        let var_b = samples.iter().map(|s| (s.1 - mean_b).powi(2)).sum::<f64>() / n;

        assert!(cov / (var_a.sqrt() * var_b.sqrt()) < -0.3);
    }

    #[test]
    fn test_same_seed_same_round() {
        let generator = generator();
        let market = MarketState::initial();

        let a = generator.generate_round(&market, 1, &mut StdRng::seed_from_u64(1));
        let b = generator.generate_round(&market, 1, &mut StdRng::seed_from_u64(1));
        assert_eq!(a, b);
    }
}
