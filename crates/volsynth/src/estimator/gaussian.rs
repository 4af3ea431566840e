//! Gaussian change model.
//!
//! Draws each horizon's change directly as `round(N(0, σ_h), 2)` percent,
//! with σ taken from a per-class table. Coverage is narrower than the
//! category profiles: only the listed categories are updated, and stocks
//! only for a fixed set of major symbols per sector.

use super::{ChangePair, Horizon, round_cents};
use crate::AssetClass;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use std::collections::HashMap;
use std::sync::LazyLock;

/// Scale applied to the stock sector figures.
pub const STOCK_SIGMA_SCALE: f64 = 0.3;

/// Extra dispersion for DeFi and layer-2 tokens.
pub const DEFI_MULTIPLIER: f64 = 2.5;

/// Standard deviations, in percent, of the 7-day and 30-day changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianProfile {
    /// Base σ of the 7-day change
    pub vol_7d: f64,
    /// Base σ of the 30-day change
    pub vol_30d: f64,
    /// Factor applied to both bases
    pub multiplier: f64,
}

impl GaussianProfile {
    /// Profile with a unit multiplier.
    pub const fn new(vol_7d: f64, vol_30d: f64) -> Self {
        Self {
            vol_7d,
            vol_30d,
            multiplier: 1.0,
        }
    }

    /// Same bases with `multiplier` applied.
    pub const fn scaled(self, multiplier: f64) -> Self {
        Self { multiplier, ..self }
    }

    /// Effective σ for `horizon`.
    pub fn sigma(&self, horizon: Horizon) -> f64 {
        let base = match horizon {
            Horizon::SevenDay => self.vol_7d,
            Horizon::ThirtyDay => self.vol_30d,
        };
        base * self.multiplier
    }

    /// Draw one horizon's change, rounded to 2 decimals.
    ///
    /// `None` if σ is not a valid standard deviation.
    pub fn sample_change<R: Rng + ?Sized>(&self, horizon: Horizon, rng: &mut R) -> Option<f64> {
        let normal = Normal::new(0.0, self.sigma(horizon)).ok()?;
        Some(round_cents(normal.sample(rng)))
    }

    /// Draw both horizons independently.
    pub fn sample_pair<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<ChangePair> {
        let change_7d = self.sample_change(Horizon::SevenDay, rng)?;
        let change_30d = self.sample_change(Horizon::ThirtyDay, rng)?;
        Some(ChangePair {
            change_7d,
            change_30d,
        })
    }
}

const TECHNOLOGY_MAJORS: &[&str] = &["AAPL", "MSFT", "GOOGL", "META", "NVDA", "AMD"];
const BANKING_MAJORS: &[&str] = &["JPM", "BAC", "GS", "MS"];
const HEALTHCARE_MAJORS: &[&str] = &["JNJ", "PFE", "MRNA", "ABBV"];
const ENERGY_MAJORS: &[&str] = &["XOM", "CVX", "COP"];
const RETAIL_MAJORS: &[&str] = &["AMZN", "COST"];
const INDUSTRIAL_MAJORS: &[&str] = &["GE", "F"];

type Entry = (AssetClass, &'static str, GaussianProfile, Option<&'static [&'static str]>);

const BUILTIN_ENTRIES: [Entry; 16] = [
    // Stocks, restricted to major symbols
    (AssetClass::Stocks, "technology", GaussianProfile::new(4.5, 8.2).scaled(STOCK_SIGMA_SCALE), Some(TECHNOLOGY_MAJORS)),
    (AssetClass::Stocks, "banking", GaussianProfile::new(3.2, 6.8).scaled(STOCK_SIGMA_SCALE), Some(BANKING_MAJORS)),
    (AssetClass::Stocks, "healthcare", GaussianProfile::new(3.8, 7.1).scaled(STOCK_SIGMA_SCALE), Some(HEALTHCARE_MAJORS)),
    (AssetClass::Stocks, "energy", GaussianProfile::new(5.2, 9.5).scaled(STOCK_SIGMA_SCALE), Some(ENERGY_MAJORS)),
    (AssetClass::Stocks, "retail", GaussianProfile::new(3.5, 7.8).scaled(STOCK_SIGMA_SCALE), Some(RETAIL_MAJORS)),
    (AssetClass::Stocks, "industrial", GaussianProfile::new(4.0, 8.5).scaled(STOCK_SIGMA_SCALE), Some(INDUSTRIAL_MAJORS)),
    // Cryptocurrencies
    (AssetClass::Cryptocurrencies, "top_tier", GaussianProfile::new(8.5, 15.2), None),
    (AssetClass::Cryptocurrencies, "defi_layer2", GaussianProfile::new(12.0, 22.8).scaled(DEFI_MULTIPLIER), None),
    (AssetClass::Cryptocurrencies, "stablecoins", GaussianProfile::new(0.1, 0.2), None),
    // Commodities
    (AssetClass::Commodities, "precious_metals", GaussianProfile::new(2.8, 5.2), None),
    (AssetClass::Commodities, "energy", GaussianProfile::new(4.5, 8.8), None),
    (AssetClass::Commodities, "industrial_metals", GaussianProfile::new(3.2, 6.5), None),
    (AssetClass::Commodities, "agricultural", GaussianProfile::new(3.8, 7.2), None),
    // Indices
    (AssetClass::Indices, "american", GaussianProfile::new(2.2, 4.8), None),
    (AssetClass::Indices, "european", GaussianProfile::new(2.5, 5.2), None),
    (AssetClass::Indices, "asian", GaussianProfile::new(2.8, 5.8), None),
];

#[derive(Debug, Clone, PartialEq)]
struct Coverage {
    profile: GaussianProfile,
    symbols: Option<&'static [&'static str]>,
}

static BUILTIN: LazyLock<GaussianTable> = LazyLock::new(|| GaussianTable {
    entries: BUILTIN_ENTRIES
        .iter()
        .map(|(class, category, profile, symbols)| {
            (
                (*class, (*category).to_string()),
                Coverage {
                    profile: *profile,
                    symbols: *symbols,
                },
            )
        })
        .collect(),
});

/// Immutable `(class, category)` → σ table with optional symbol
/// restrictions.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianTable {
    entries: HashMap<(AssetClass, String), Coverage>,
}

impl GaussianTable {
    /// The built-in table, constructed once per process.
    pub fn builtin() -> &'static Self {
        &BUILTIN
    }

    /// Profile for `symbol` in `class` / `category`, or `None` when the
    /// model does not cover it.
    pub fn lookup(&self, class: AssetClass, category: &str, symbol: &str) -> Option<&GaussianProfile> {
        let coverage = self.entries.get(&(class, category.to_string()))?;
        coverage
            .symbols
            .is_none_or(|symbols| symbols.contains(&symbol))
            .then_some(&coverage.profile)
    }

    /// Profile of `class` / `category` regardless of any symbol restriction.
    pub fn profile(&self, class: AssetClass, category: &str) -> Option<&GaussianProfile> {
        self.entries
            .get(&(class, category.to_string()))
            .map(|coverage| &coverage.profile)
    }

    /// Categories of `class` the model covers, sorted.
    pub fn categories(&self, class: AssetClass) -> Vec<&str> {
        let mut categories: Vec<_> = self
            .entries
            .keys()
            .filter(|(c, _)| *c == class)
            .map(|(_, category)| category.as_str())
            .collect();
        categories.sort_unstable();
        categories
    }

    /// Number of covered categories across all classes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table covers nothing.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
