//! Trade validation errors

use odyssey_core::{Amount, AssetId, Price, Quantity};
use thiserror::Error;

/// Why a trade was rejected; a rejected trade never changes player state
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TradeError {
    #[error("Insufficient funds: need {required:.2}, have {available:.2}")]
    InsufficientFunds { required: Amount, available: Amount },

    #[error("Insufficient holdings of {asset}: need {required}, have {available}")]
    InsufficientHoldings {
        asset: AssetId,
        required: Quantity,
        available: Quantity,
    },

    #[error(
        "Stale price for {asset}: quoted {quoted} in round {quoted_round}, now {current} in round {current_round}"
    )]
    StalePrice {
        asset: AssetId,
        quoted: Price,
        quoted_round: u32,
        current: Price,
        current_round: u32,
    },

    #[error("No usable price for {0}")]
    PriceUnavailable(AssetId),

    #[error("Invalid order: {0}")]
    InvalidOrder(String),
}

pub type Result<T> = std::result::Result<T, TradeError>;
