use odyssey_core::{AssetId, MarketState, Price};
use serde::{Deserialize, Serialize};

/// How one asset performed over a game, in percent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetPerformance {
    pub asset: AssetId,
    pub start_price: Price,
    pub end_price: Price,
    pub total_return_pct: f64,
    pub mean_return_pct: f64,
    /// Population standard deviation of per-round returns
    pub std_dev_pct: f64,
    pub min_return_pct: f64,
    pub max_return_pct: f64,
}

/// Per-round returns of a price path, in percent
pub fn round_returns_pct(history: &[Price]) -> Vec<f64> {
    history
        .windows(2)
        .filter(|pair| pair[0] > 0.0)
        .map(|pair| (pair[1] - pair[0]) / pair[0] * 100.0)
        .collect()
}

/// Performance of every asset with at least one completed round
pub fn asset_performance(market: &MarketState) -> Vec<AssetPerformance> {
    AssetId::ALL
        .into_iter()
        .filter_map(|asset| {
            let history = market.price_history.get(&asset)?;
            let returns = round_returns_pct(history);
            if returns.is_empty() {
                return None;
            }

            let start_price = *history.first()?;
            let end_price = *history.last()?;
            let n = returns.len() as f64;
            let mean = returns.iter().sum::<f64>() / n;
            let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;

            Some(AssetPerformance {
                asset,
                start_price,
                end_price,
                total_return_pct: (end_price - start_price) / start_price * 100.0,
                mean_return_pct: mean,
                std_dev_pct: variance.sqrt(),
                min_return_pct: returns.iter().copied().fold(f64::INFINITY, f64::min),
                max_return_pct: returns.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            })
        })
        .collect()
}
