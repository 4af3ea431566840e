//! Historical returns estimator - realized volatility from closing prices.
//!
//! Historical volatility is the sample standard deviation of simple returns
//! over a trailing window, annualized by scaling with `sqrt(252)` and
//! expressed in percent.

use super::{ChangePair, Horizon, round_cents};
use crate::{Result, VolatilityError};

/// Trading days per year used for annualization.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Annualized realized-volatility estimator.
///
/// Formula: `σ_annual = std(returns) × sqrt(trading_days) × 100`
///
/// Returns are simple returns `(p_i - p_{i-1}) / p_{i-1}`; pairs whose
/// previous price is not positive are skipped rather than aborting the
/// series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoricalEstimator {
    trading_days: f64,
}

impl HistoricalEstimator {
    /// Create an estimator annualizing over 252 trading days.
    pub const fn new() -> Self {
        Self {
            trading_days: TRADING_DAYS_PER_YEAR,
        }
    }

    /// Create an estimator with a custom trading-day count.
    pub const fn with_trading_days(trading_days: f64) -> Self {
        Self { trading_days }
    }

    /// Trading days per year used for annualization.
    pub const fn trading_days(&self) -> f64 {
        self.trading_days
    }

    /// Annualized volatility in percent over the trailing `days` prices.
    ///
    /// Any insufficient-data condition yields `0.0`.
    pub fn estimate_volatility(&self, prices: &[f64], days: usize) -> f64 {
        self.try_estimate(prices, days).unwrap_or(0.0)
    }

    /// Like [`Self::estimate_volatility`] but reports why no figure could be
    /// produced.
    ///
    /// A series with valid returns but no dispersion (constant prices, or a
    /// single return) is a real result of `0.0`, not an error.
    pub fn try_estimate(&self, prices: &[f64], days: usize) -> Result<f64> {
        let insufficient = |available| VolatilityError::InsufficientData {
            required: days.max(2),
            available,
        };

        if prices.len() < days {
            return Err(insufficient(prices.len()));
        }

        let window = &prices[prices.len() - days..];
        if window.len() < 2 {
            return Err(insufficient(window.len()));
        }

        let returns = simple_returns(window);
        if returns.is_empty() {
            return Err(insufficient(0));
        }

        let volatility = sample_std_dev(&returns).unwrap_or(0.0) * self.trading_days.sqrt();
        Ok(volatility * 100.0)
    }

    /// Estimate both horizons from one series, rounded to 2 decimals.
    pub fn change_pair(&self, prices: &[f64]) -> ChangePair {
        ChangePair {
            change_7d: round_cents(self.estimate_volatility(prices, Horizon::SevenDay.days())),
            change_30d: round_cents(self.estimate_volatility(prices, Horizon::ThirtyDay.days())),
        }
    }
}

impl Default for HistoricalEstimator {
    fn default() -> Self {
        Self::new()
    }
}

/// Simple returns of consecutive prices.
///
/// Pairs with a non-positive previous price and non-finite results are
/// dropped.
pub fn simple_returns(prices: &[f64]) -> Vec<f64> {
    prices
        .windows(2)
        .filter(|pair| pair[0] > 0.0)
        .map(|pair| (pair[1] - pair[0]) / pair[0])
        .filter(|r| r.is_finite())
        .collect()
}

/// Sample standard deviation (n - 1 denominator).
///
/// `None` for fewer than two observations.
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Some(variance.sqrt())
}
