//! Price history inputs for the historical estimator.
//!
//! The engine only consumes an ordered series of closing prices. Where the
//! series comes from (a snapshot file, a simulator, nothing at all) is the
//! business of a [`PriceHistoryProvider`]. Provider failures degrade to an
//! empty series, which routes the symbol to the synthetic generator.

use crate::{Result, VolatilityError, estimator::Horizon};
use rand::{SeedableRng, rngs::StdRng};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::warn;

/// Closing prices ordered oldest to newest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceSeries(Vec<f64>);

impl PriceSeries {
    /// Wrap an ordered list of prices.
    pub const fn new(prices: Vec<f64>) -> Self {
        Self(prices)
    }

    /// Number of prices.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the series has no prices.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether the series is long enough for a `days` lookback.
    pub fn covers(&self, days: usize) -> bool {
        self.0.len() >= days.max(2)
    }

    /// Prices as a slice.
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Most recent price.
    pub fn last(&self) -> Option<f64> {
        self.0.last().copied()
    }
}

impl From<Vec<f64>> for PriceSeries {
    fn from(prices: Vec<f64>) -> Self {
        Self(prices)
    }
}

impl FromIterator<f64> for PriceSeries {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Source of closing-price history per symbol.
pub trait PriceHistoryProvider: std::fmt::Debug {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Fetch the series for `symbol`.
    ///
    /// Unknown symbols should produce an empty series rather than an error.
    fn fetch(&self, symbol: &str) -> Result<PriceSeries>;

    /// Fetch the series for `symbol`, degrading any failure to an empty
    /// series.
    fn closing_prices(&self, symbol: &str) -> PriceSeries {
        self.fetch(symbol).unwrap_or_else(|e| {
            warn!(provider = self.name(), symbol, error = %e, "price history unavailable");
            PriceSeries::default()
        })
    }
}

/// Provider with no history; every symbol is synthesized.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHistory;

impl PriceHistoryProvider for NoHistory {
    fn name(&self) -> &str {
        "none"
    }

    fn fetch(&self, _symbol: &str) -> Result<PriceSeries> {
        Ok(PriceSeries::default())
    }
}

/// Provider backed by an in-memory symbol → series map.
///
/// Can be loaded from a JSON snapshot of the form
/// `{ "AAPL": [189.1, 190.4, ...], ... }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InMemoryHistory {
    series: HashMap<String, PriceSeries>,
}

impl InMemoryHistory {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a JSON snapshot file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => VolatilityError::MissingInput(path.to_path_buf()),
            _ => VolatilityError::io(path, e),
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Register (or replace) the series for `symbol`.
    pub fn insert(&mut self, symbol: impl Into<String>, prices: impl Into<PriceSeries>) {
        self.series.insert(symbol.into(), prices.into());
    }

    /// Number of symbols with history.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// Whether no symbol has history.
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

impl PriceHistoryProvider for InMemoryHistory {
    fn name(&self) -> &str {
        "snapshot"
    }

    fn fetch(&self, symbol: &str) -> Result<PriceSeries> {
        Ok(self.series.get(symbol).cloned().unwrap_or_default())
    }
}

/// Reference prices the simulated walks start from.
const DEFAULT_ANCHORS: [(&str, f64); 15] = [
    ("BTC", 45_000.0),
    ("ETH", 2_500.0),
    ("BNB", 300.0),
    ("XRP", 0.5),
    ("ADA", 0.3),
    ("DOGE", 0.08),
    ("SOL", 100.0),
    ("DOT", 4.0),
    ("AVAX", 25.0),
    ("LINK", 15.0),
    ("MATIC", 0.8),
    ("UNI", 6.0),
    ("LTC", 70.0),
    ("USDT", 1.0),
    ("USDC", 1.0),
];

/// Provider generating a seeded geometric random walk per symbol.
///
/// Each walk starts at the symbol's anchor price and applies `days` daily
/// moves `price *= 1 + N(0, daily_volatility)`. The same seed and symbol
/// always yield the same series.
#[derive(Debug, Clone)]
pub struct SimulatedHistory {
    seed: u64,
    days: usize,
    daily_volatility: f64,
    default_anchor: f64,
    anchors: HashMap<String, f64>,
}

impl SimulatedHistory {
    /// Create a simulator with 30 days of 4% daily moves.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            days: Horizon::longest().days(),
            daily_volatility: 0.04,
            default_anchor: 100.0,
            anchors: DEFAULT_ANCHORS
                .iter()
                .map(|(symbol, price)| ((*symbol).to_string(), *price))
                .collect(),
        }
    }

    /// Set the number of simulated days.
    pub fn with_days(mut self, days: usize) -> Self {
        self.days = days;
        self
    }

    /// Set the standard deviation of daily moves.
    pub fn with_daily_volatility(mut self, daily_volatility: f64) -> Self {
        self.daily_volatility = daily_volatility;
        self
    }

    /// Set the starting price for `symbol`.
    pub fn with_anchor(mut self, symbol: impl Into<String>, price: f64) -> Self {
        self.anchors.insert(symbol.into(), price);
        self
    }

    fn symbol_seed(&self, symbol: &str) -> u64 {
        // FNV-1a keeps per-symbol streams stable across runs and platforms
        symbol.bytes().fold(0xcbf2_9ce4_8422_2325_u64 ^ self.seed, |hash, byte| {
            (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
        })
    }
}

impl PriceHistoryProvider for SimulatedHistory {
    fn name(&self) -> &str {
        "simulated"
    }

    fn fetch(&self, symbol: &str) -> Result<PriceSeries> {
        let normal = Normal::new(0.0, self.daily_volatility).map_err(|e| VolatilityError::History {
            provider: self.name().to_string(),
            reason: format!("daily volatility {}: {e}", self.daily_volatility),
        })?;
        let mut rng = StdRng::seed_from_u64(self.symbol_seed(symbol));
        let mut price = self.anchors.get(symbol).copied().unwrap_or(self.default_anchor);

        Ok((0..self.days)
            .map(|_| {
                price *= 1.0 + normal.sample(&mut rng);
                price
            })
            .collect())
    }
}
