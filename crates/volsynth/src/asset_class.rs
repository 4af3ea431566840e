//! Asset classes and their dataset conventions.

use crate::VolatilityError;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Top-level grouping of the catalogue; one dataset file per class.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetClass {
    /// Equities, partitioned by sector
    #[display("stocks")]
    Stocks,
    /// Cryptocurrencies, partitioned by tier
    #[display("cryptocurrencies")]
    Cryptocurrencies,
    /// Commodities, partitioned by market
    #[display("commodities")]
    Commodities,
    /// Market indices, partitioned by region
    #[display("indices")]
    Indices,
}

impl AssetClass {
    /// All classes in orchestration order.
    pub const ALL: [Self; 4] = [
        Self::Stocks,
        Self::Cryptocurrencies,
        Self::Commodities,
        Self::Indices,
    ];

    /// Key of the class object inside its dataset document.
    pub const fn key(self) -> &'static str {
        match self {
            Self::Stocks => "stocks",
            Self::Cryptocurrencies => "cryptocurrencies",
            Self::Commodities => "commodities",
            Self::Indices => "indices",
        }
    }

    /// Conventional dataset file name.
    pub const fn default_file_name(self) -> &'static str {
        match self {
            Self::Stocks => "stocks_complete_data.json",
            Self::Cryptocurrencies => "cryptocurrencies_complete_data.json",
            Self::Commodities => "commodities_complete_data.json",
            Self::Indices => "indices_complete_data.json",
        }
    }

    /// Categories eligible for update, or `None` when every category is.
    ///
    /// Cryptocurrencies only update their tiered sub-categories.
    pub const fn category_allowlist(self) -> Option<&'static [&'static str]> {
        match self {
            Self::Cryptocurrencies => Some(&["top_tier", "defi_layer2", "stablecoins"]),
            Self::Stocks | Self::Commodities | Self::Indices => None,
        }
    }

    /// Whether `category` of this class should be updated.
    pub fn includes_category(self, category: &str) -> bool {
        self.category_allowlist()
            .is_none_or(|allowed| allowed.contains(&category))
    }
}

impl FromStr for AssetClass {
    type Err = VolatilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stocks" | "stock" => Ok(Self::Stocks),
            "cryptocurrencies" | "crypto" => Ok(Self::Cryptocurrencies),
            "commodities" | "commodity" => Ok(Self::Commodities),
            "indices" | "index" => Ok(Self::Indices),
            _ => Err(VolatilityError::UnknownAssetClass(s.to_string())),
        }
    }
}
