use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::normal::standard_normal;

/// Per-round CPI inflation model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CpiModel {
    pub mean_increase: f64,
    pub std_dev: f64,
    pub min_increase: f64,
    pub max_increase: f64,
}

impl CpiModel {
    /// Inflation for one round, clamped to the allowed band
    pub fn draw_increase<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        (self.mean_increase + self.std_dev * standard_normal(rng))
            .clamp(self.min_increase, self.max_increase)
    }

    /// Next CPI level
    pub fn next<R: Rng + ?Sized>(&self, cpi: f64, rng: &mut R) -> f64 {
        cpi * (1.0 + self.draw_increase(rng))
    }
}

impl Default for CpiModel {
    fn default() -> Self {
        Self {
            mean_increase: 0.025,
            std_dev: 0.015,
            min_increase: -0.01,
            max_increase: 0.06,
        }
    }
}
