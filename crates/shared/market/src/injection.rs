use odyssey_core::Amount;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::normal::uniform_between;

/// Scripted per-round cash credit simulating a growing economy
///
/// Round `r >= 1` pays `base + per_round * r` plus uniform noise in
/// `[-variability, variability]`, never below zero. Round 0 pays nothing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CashInjectionConfig {
    pub base: Amount,
    pub per_round: Amount,
    pub variability: Amount,
}

impl CashInjectionConfig {
    /// Draw the injection for a round
    pub fn amount<R: Rng + ?Sized>(&self, round: u32, rng: &mut R) -> Amount {
        if round == 0 {
            return 0.0;
        }
        let noise = if self.variability > 0.0 {
            uniform_between(rng, -self.variability, self.variability)
        } else {
            0.0
        };
        (self.base + self.per_round * round as f64 + noise).max(0.0)
    }

    /// Injection without noise, e.g. for previews
    pub fn expected(&self, round: u32) -> Amount {
        if round == 0 {
            0.0
        } else {
            (self.base + self.per_round * round as f64).max(0.0)
        }
    }
}

impl Default for CashInjectionConfig {
    fn default() -> Self {
        Self {
            base: 5_000.0,
            per_round: 500.0,
            variability: 1_000.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_round_zero_pays_nothing() {
        let config = CashInjectionConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(config.amount(0, &mut rng), 0.0);
    }

    #[test]
    fn test_amount_within_noise_band() {
        let config = CashInjectionConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        for round in 1..=20 {
            let amount = config.amount(round, &mut rng);
            let expected = config.expected(round);
            assert!((amount - expected).abs() <= 1_000.0);
        }
    }

    #[test]
    fn test_never_negative() {
        let config = CashInjectionConfig {
            base: -10_000.0,
            per_round: 0.0,
            variability: 100.0,
        };
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(config.amount(3, &mut rng), 0.0);
    }

    #[test]
    fn test_fixed_without_variability() {
        let config = CashInjectionConfig {
            base: 4_800.0,
            per_round: 500.0,
            variability: 0.0,
        };
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(config.amount(1, &mut rng), 5_300.0);
    }
}
