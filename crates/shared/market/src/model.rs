//! Market model parameters
//!
//! Per-asset annual return profiles and the fixed correlation matrix the
//! generator mixes independent normals through.

use odyssey_core::AssetId;
use serde::{Deserialize, Serialize};

/// Correlation matrix over [`AssetId::ALL`] order
pub const CORRELATION: [[f64; AssetId::COUNT]; AssetId::COUNT] = [
    [1.0000, -0.5169, 0.3425, 0.0199, 0.1243, 0.4057],
    [-0.5169, 1.0000, 0.0176, 0.0289, -0.0235, -0.2259],
    [0.3425, 0.0176, 1.0000, -0.4967, -0.0334, 0.1559],
    [0.0199, 0.0289, -0.4967, 1.0000, 0.0995, -0.5343],
    [0.1243, -0.0235, -0.0334, 0.0995, 1.0000, 0.0436],
    [0.4057, -0.2259, 0.1559, -0.5343, 0.0436, 1.0000],
];

/// Distribution and hard bounds of one asset's per-round return
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnProfile {
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl ReturnProfile {
    pub const fn new(mean: f64, std_dev: f64, min: f64, max: f64) -> Self {
        Self {
            mean,
            std_dev,
            min,
            max,
        }
    }

    /// Clamp a return into `[min, max]`
    pub fn clamp(&self, r: f64) -> f64 {
        r.clamp(self.min, self.max)
    }

    pub fn contains(&self, r: f64) -> bool {
        (self.min..=self.max).contains(&r)
    }
}

/// Historical return profile for each asset
pub fn default_profile(asset: AssetId) -> ReturnProfile {
    match asset {
        AssetId::Sp500 => ReturnProfile::new(0.1151, 0.1949, -0.43, 0.50),
        AssetId::Bonds => ReturnProfile::new(0.0334, 0.0301, 0.0003, 0.14),
        AssetId::RealEstate => ReturnProfile::new(0.0439, 0.0620, -0.12, 0.24),
        AssetId::Gold => ReturnProfile::new(0.0648, 0.2076, -0.32, 1.25),
        AssetId::Commodities => ReturnProfile::new(0.0815, 0.1522, -0.25, 2.00),
        AssetId::Bitcoin => ReturnProfile::new(0.50, 1.00, -0.73, 2.50),
    }
}

/// Bitcoin regime thresholds and crash-cycle parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BitcoinRegime {
    /// Below this price Bitcoin is in the rapid-growth regime
    pub growth_below: f64,
    /// Growth-regime return is drawn from `[low, high)`
    pub growth_return: (f64, f64),
    /// At or above this price Bitcoin is in the crash regime
    pub crash_at: f64,
    /// Crash-regime return is drawn from `[low, high)`
    pub crash_return: (f64, f64),
    /// Above this price volatility is damped
    pub damping_above: f64,
    /// Price step per damping increment
    pub damping_step: f64,
    /// Volatility reduction per step
    pub damping_per_step: f64,
    /// Maximum volatility reduction
    pub damping_cap: f64,
    /// Rounds that must pass after a crash before another can be forced
    pub crash_cycle_rounds: u32,
    /// Chance of a forced crash once the cycle is due
    pub crash_probability: f64,
    /// Added to both shock bounds after every forced crash
    pub shock_decay: f64,
    /// Lowest value each shock bound may take after decaying
    pub shock_floor: (f64, f64),
    /// Highest value each shock bound may take after decaying
    pub shock_ceiling: (f64, f64),
    /// Distance from a bound that triggers a re-roll
    pub bound_margin: f64,
    /// Half-width of the re-roll window, as a fraction of the bound
    pub reroll_fraction: f64,
}

impl Default for BitcoinRegime {
    fn default() -> Self {
        Self {
            growth_below: 10_000.0,
            growth_return: (2.0, 4.0),
            crash_at: 1_000_000.0,
            crash_return: (-0.5, -0.3),
            damping_above: 100_000.0,
            damping_step: 50_000.0,
            damping_per_step: 0.05,
            damping_cap: 0.7,
            crash_cycle_rounds: 4,
            crash_probability: 0.5,
            shock_decay: 0.1,
            shock_floor: (-0.5, -0.75),
            shock_ceiling: (-0.05, -0.15),
            bound_margin: 0.01,
            reroll_fraction: 0.05,
        }
    }
}

/// Everything the return generator needs besides randomness
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketModel {
    /// Return profiles in [`AssetId::ALL`] order
    pub profiles: [ReturnProfile; AssetId::COUNT],
    pub correlation: [[f64; AssetId::COUNT]; AssetId::COUNT],
    pub bitcoin: BitcoinRegime,
}

impl MarketModel {
    pub fn profile(&self, asset: AssetId) -> &ReturnProfile {
        &self.profiles[asset.index()]
    }

    /// Mix independent standard normals into the correlated normal for `asset`
    pub fn correlated(&self, asset: AssetId, z: &[f64; AssetId::COUNT]) -> f64 {
        self.correlation[asset.index()]
            .iter()
            .zip(z.iter())
            .map(|(c, z)| c * z)
            .sum()
    }
}

impl Default for MarketModel {
    fn default() -> Self {
        Self {
            profiles: AssetId::ALL.map(default_profile),
            correlation: CORRELATION,
            bitcoin: BitcoinRegime::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correlation_is_symmetric_with_unit_diagonal() {
        for i in 0..AssetId::COUNT {
            assert_eq!(CORRELATION[i][i], 1.0);
            for j in 0..AssetId::COUNT {
                assert_eq!(CORRELATION[i][j], CORRELATION[j][i]);
            }
        }
    }

    #[test]
    fn test_profiles_ordered_by_asset() {
        let model = MarketModel::default();
        assert_eq!(model.profile(AssetId::Bitcoin).max, 2.50);
        assert_eq!(model.profile(AssetId::Bonds).min, 0.0003);
        for profile in &model.profiles {
            assert!(profile.min < profile.mean && profile.mean < profile.max);
        }
    }

    #[test]
    fn test_correlated_picks_matrix_row() {
        let model = MarketModel::default();
        let mut z = [0.0; AssetId::COUNT];
        z[AssetId::Gold.index()] = 1.0;
        assert_eq!(model.correlated(AssetId::Bitcoin, &z), -0.5343);
    }
}
