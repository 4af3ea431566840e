//! Volatility estimators.
//!
//! Three interchangeable strategies populate `change_7d` / `change_30d`:
//! the category-parameterized [`SyntheticGenerator`], the returns-based
//! [`HistoricalEstimator`] and the per-class [`GaussianProfile`] draws.
//! Under the default [`VolatilityModel::Synthetic`] model,
//! [`VolatilityEstimator::select`] picks synthetic or historical per symbol
//! based on whether usable price history is available.

pub mod gaussian;
pub mod historical;
pub mod synthetic;

pub use gaussian::{GaussianProfile, GaussianTable};
pub use historical::{HistoricalEstimator, TRADING_DAYS_PER_YEAR};
pub use synthetic::SyntheticGenerator;

use crate::{PriceSeries, VolatilityError, profile::VolatilityProfile, record::Price};
use derive_more::Display;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Model a run uses to populate change figures.
#[derive(Debug, Display, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolatilityModel {
    /// Category profiles, or realized returns when history covers 30 days
    #[default]
    #[display("synthetic")]
    Synthetic,
    /// Normal draws from the per-class σ table; uncovered records untouched
    #[display("gaussian")]
    Gaussian,
}

impl FromStr for VolatilityModel {
    type Err = VolatilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "synthetic" => Ok(Self::Synthetic),
            "gaussian" | "normal" => Ok(Self::Gaussian),
            _ => Err(VolatilityError::UnknownModel(s.to_string())),
        }
    }
}

/// Time window of a volatility figure.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Horizon {
    /// Seven days
    #[display("7d")]
    SevenDay,
    /// Thirty days
    #[display("30d")]
    ThirtyDay,
}

impl Horizon {
    /// Both horizons, shortest first.
    pub const ALL: [Self; 2] = [Self::SevenDay, Self::ThirtyDay];

    /// Lookback window in days.
    pub const fn days(self) -> usize {
        match self {
            Self::SevenDay => 7,
            Self::ThirtyDay => 30,
        }
    }

    /// Record field the horizon's figure is written to.
    pub const fn field(self) -> &'static str {
        match self {
            Self::SevenDay => "change_7d",
            Self::ThirtyDay => "change_30d",
        }
    }

    /// Longest horizon; history must cover it for the historical strategy.
    pub const fn longest() -> Self {
        Self::ThirtyDay
    }
}

/// Percentage figures for both horizons.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChangePair {
    /// 7-day figure, in percent
    pub change_7d: f64,
    /// 30-day figure, in percent
    pub change_30d: f64,
}

impl ChangePair {
    /// Figure for `horizon`.
    pub const fn get(&self, horizon: Horizon) -> f64 {
        match horizon {
            Horizon::SevenDay => self.change_7d,
            Horizon::ThirtyDay => self.change_30d,
        }
    }
}

/// Which strategy produced a [`ChangePair`].
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EstimatorKind {
    /// Randomized, category-parameterized model
    #[display("synthetic")]
    Synthetic,
    /// Annualized volatility of realized returns
    #[display("historical")]
    Historical,
    /// Normal draw from the per-class σ table
    #[display("gaussian")]
    Gaussian,
}

/// Strategy used to populate one record's change figures.
#[derive(Debug, Clone, Copy)]
pub enum VolatilityEstimator<'a> {
    /// Sample from the category profile.
    Synthetic(SyntheticGenerator),
    /// Estimate from a price series.
    Historical {
        /// Returns-based estimator
        estimator: HistoricalEstimator,
        /// Closing prices, oldest first
        prices: &'a PriceSeries,
    },
    /// Draw from a normal distribution.
    Gaussian(GaussianProfile),
}

impl<'a> VolatilityEstimator<'a> {
    /// Historical when `prices` covers the longest horizon, synthetic
    /// otherwise.
    pub fn select(prices: &'a PriceSeries) -> Self {
        if prices.covers(Horizon::longest().days()) {
            Self::Historical {
                estimator: HistoricalEstimator::default(),
                prices,
            }
        } else {
            Self::Synthetic(SyntheticGenerator)
        }
    }

    /// Strategy tag.
    pub const fn kind(&self) -> EstimatorKind {
        match self {
            Self::Synthetic(_) => EstimatorKind::Synthetic,
            Self::Historical { .. } => EstimatorKind::Historical,
            Self::Gaussian(_) => EstimatorKind::Gaussian,
        }
    }

    /// Produce both horizons for an asset priced at `price`.
    ///
    /// Returns `None` when the price is unavailable; such records are left
    /// untouched by callers. `profile` is only consulted by the synthetic
    /// strategy.
    pub fn estimate<R: Rng + ?Sized>(
        &self,
        price: Price,
        profile: &VolatilityProfile,
        rng: &mut R,
    ) -> Option<ChangePair> {
        match self {
            Self::Synthetic(generator) => generator.synthesize(price, profile, rng),
            Self::Historical { estimator, prices } => price
                .value()
                .map(|_| estimator.change_pair(prices.as_slice())),
            Self::Gaussian(gaussian) => price.value().and_then(|_| gaussian.sample_pair(rng)),
        }
    }
}

/// Round a percentage to 2 decimal places.
///
/// Rounds the exact binary value, so `2.675` (stored as 2.67499...) becomes
/// `2.67` rather than the `2.68` that scaling by 100 first would give.
pub(crate) fn round_cents(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{value:.2}").parse().unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProfileTable;
    use rand::{SeedableRng, rngs::StdRng};
    use rstest::rstest;

    #[test]
    fn test_horizon_metadata() {
        assert_eq!(Horizon::SevenDay.days(), 7);
        assert_eq!(Horizon::ThirtyDay.days(), 30);
        assert_eq!(Horizon::SevenDay.field(), "change_7d");
        assert_eq!(Horizon::ThirtyDay.field(), "change_30d");
        assert_eq!(Horizon::SevenDay.to_string(), "7d");
        assert_eq!(Horizon::longest(), Horizon::ThirtyDay);
    }

    #[test]
    fn test_select_by_history_length() {
        let short = PriceSeries::from(vec![100.0; 29]);
        let full = PriceSeries::from(vec![100.0; 30]);
        let empty = PriceSeries::default();

        assert_eq!(VolatilityEstimator::select(&empty).kind(), EstimatorKind::Synthetic);
        assert_eq!(VolatilityEstimator::select(&short).kind(), EstimatorKind::Synthetic);
        assert_eq!(VolatilityEstimator::select(&full).kind(), EstimatorKind::Historical);
    }

    #[test]
    fn test_historical_strategy_on_constant_series() {
        let prices = PriceSeries::from(vec![50.0; 30]);
        let estimator = VolatilityEstimator::select(&prices);
        let profile = ProfileTable::builtin().lookup("banking");
        let mut rng = StdRng::seed_from_u64(7);

        let pair = estimator.estimate(Price::Quoted(50.0), profile, &mut rng).unwrap();
        assert_eq!(pair, ChangePair { change_7d: 0.0, change_30d: 0.0 });
    }

    #[test]
    fn test_unpriced_asset_is_skipped_by_every_strategy() {
        let prices = PriceSeries::from(vec![50.0; 30]);
        let profile = ProfileTable::builtin().lookup("banking");
        let mut rng = StdRng::seed_from_u64(7);

        for series in [&prices, &PriceSeries::default()] {
            let estimator = VolatilityEstimator::select(series);
            assert!(estimator.estimate(Price::Unavailable, profile, &mut rng).is_none());
        }
    }

    #[test]
    fn test_round_cents() {
        assert_eq!(round_cents(1.234), 1.23);
        assert_eq!(round_cents(-1.236), -1.24);
        assert_eq!(round_cents(0.0), 0.0);
        assert!(round_cents(f64::NAN).is_nan());
    }

    #[rstest]
    #[case(2.675, 2.67)]
    #[case(-2.675, -2.67)]
    #[case(1.005, 1.0)]
    #[case(0.285, 0.28)]
    #[case(2.875, 2.88)]
    fn test_round_cents_uses_exact_binary_value(#[case] value: f64, #[case] expected: f64) {
        assert_eq!(round_cents(value), expected);
    }

    #[test]
    fn test_model_parse_and_default() {
        assert_eq!(VolatilityModel::default(), VolatilityModel::Synthetic);
        assert_eq!("Gaussian".parse::<VolatilityModel>().unwrap(), VolatilityModel::Gaussian);
        assert_eq!("synthetic".parse::<VolatilityModel>().unwrap(), VolatilityModel::Synthetic);
        assert!(matches!(
            "garch".parse::<VolatilityModel>(),
            Err(VolatilityError::UnknownModel(_))
        ));
        assert_eq!(VolatilityModel::Gaussian.to_string(), "gaussian");
    }

    #[test]
    fn test_gaussian_strategy() {
        let gaussian = *GaussianTable::builtin()
            .lookup(crate::AssetClass::Indices, "european", "DAX")
            .unwrap();
        let estimator = VolatilityEstimator::Gaussian(gaussian);
        let profile = ProfileTable::builtin().lookup("european");
        let mut rng = StdRng::seed_from_u64(12);

        assert_eq!(estimator.kind(), EstimatorKind::Gaussian);
        assert!(estimator.estimate(Price::Unavailable, profile, &mut rng).is_none());
        let pair = estimator.estimate(Price::Quoted(16_000.0), profile, &mut rng).unwrap();
        assert!(pair.change_7d.is_finite() && pair.change_30d.is_finite());
    }
}
