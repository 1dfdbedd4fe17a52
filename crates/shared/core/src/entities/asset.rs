use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

use crate::values::Price;

/// Tradeable asset classes in the game
///
/// The declaration order is the row/column order of the correlation
/// matrix, so `index()` can be used to address it directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AssetId {
    #[serde(rename = "S&P 500")]
    Sp500,
    #[serde(rename = "Bonds")]
    Bonds,
    #[serde(rename = "Real Estate")]
    RealEstate,
    #[serde(rename = "Gold")]
    Gold,
    #[serde(rename = "Commodities")]
    Commodities,
    #[serde(rename = "Bitcoin")]
    Bitcoin,
}

impl AssetId {
    /// Number of assets in the game
    pub const COUNT: usize = 6;

    /// All assets in correlation-matrix order
    pub const ALL: [AssetId; AssetId::COUNT] = [
        AssetId::Sp500,
        AssetId::Bonds,
        AssetId::RealEstate,
        AssetId::Gold,
        AssetId::Commodities,
        AssetId::Bitcoin,
    ];

    /// Position in correlation-matrix order
    pub fn index(self) -> usize {
        self as usize
    }

    /// Display name, also used as the persisted key
    pub fn name(self) -> &'static str {
        match self {
            AssetId::Sp500 => "S&P 500",
            AssetId::Bonds => "Bonds",
            AssetId::RealEstate => "Real Estate",
            AssetId::Gold => "Gold",
            AssetId::Commodities => "Commodities",
            AssetId::Bitcoin => "Bitcoin",
        }
    }

    /// Price at round 0
    pub fn initial_price(self) -> Price {
        match self {
            AssetId::Sp500 => 100.0,
            AssetId::Bonds => 100.0,
            AssetId::RealEstate => 5_000.0,
            AssetId::Gold => 3_000.0,
            AssetId::Commodities => 100.0,
            AssetId::Bitcoin => 50_000.0,
        }
    }

    /// Lowest price the asset may ever reach
    pub fn price_floor(self) -> Price {
        match self {
            AssetId::Bitcoin => 1_000.0,
            _ => 10.0,
        }
    }
}

impl std::fmt::Display for AssetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown asset: {0}")]
pub struct UnknownAsset(pub String);

impl FromStr for AssetId {
    type Err = UnknownAsset;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        AssetId::ALL
            .into_iter()
            .find(|asset| asset.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownAsset(trimmed.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_follows_declaration_order() {
        for (i, asset) in AssetId::ALL.iter().enumerate() {
            assert_eq!(asset.index(), i);
        }
        assert_eq!(AssetId::Bitcoin.index(), 5);
    }

    #[test]
    fn test_parse_display_names() {
        assert_eq!("S&P 500".parse::<AssetId>().unwrap(), AssetId::Sp500);
        assert_eq!("real estate".parse::<AssetId>().unwrap(), AssetId::RealEstate);
        assert!("Dogecoin".parse::<AssetId>().is_err());
    }

    #[test]
    fn test_serializes_under_display_name() {
        let json = serde_json::to_string(&AssetId::Sp500).unwrap();
        assert_eq!(json, "\"S&P 500\"");
    }

    #[test]
    fn test_initial_prices_sit_above_floor() {
        for asset in AssetId::ALL {
            assert!(asset.initial_price() > asset.price_floor());
        }
    }
}
