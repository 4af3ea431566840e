//! Category batch updater.
//!
//! Walks `dataset[class] → category → symbol → record` in document order and
//! overwrites each priced record's `change_7d` / `change_30d`. The class
//! subtree is rebuilt on a copy and swapped in only when every record was
//! processed, so a malformed document is never left half-updated.
//!
//! Under [`VolatilityModel::Gaussian`] only records the Gaussian table covers
//! are rewritten, keyed by the dataset section category.

use crate::{
    AssetClass, Result, VolatilityError,
    estimator::{EstimatorKind, GaussianTable, VolatilityEstimator, VolatilityModel},
    history::PriceHistoryProvider,
    profile::ProfileTable,
    record::AssetRecord,
};
use rand::Rng;
use serde_json::{Map, Value};
use tracing::debug;

/// Counters for one class update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassReport {
    /// Categories whose records were visited
    pub categories: usize,
    /// Categories excluded by the class allowlist
    pub skipped_categories: usize,
    /// Records whose change fields were rewritten
    pub updated: usize,
    /// Of `updated`, records computed from price history
    pub historical: usize,
    /// Records left untouched for lack of a usable price
    pub unpriced: usize,
    /// Priced records the Gaussian model does not cover
    pub uncovered: usize,
}

/// Applies volatility estimates to every record of an asset class.
#[derive(Debug)]
pub struct BatchUpdater<'a, P: PriceHistoryProvider + ?Sized> {
    table: &'a ProfileTable,
    history: &'a P,
    model: VolatilityModel,
}

impl<'a, P: PriceHistoryProvider + ?Sized> BatchUpdater<'a, P> {
    /// Create an updater resolving profiles from `table` and history from
    /// `history`.
    pub const fn new(table: &'a ProfileTable, history: &'a P) -> Self {
        Self {
            table,
            history,
            model: VolatilityModel::Synthetic,
        }
    }

    /// Use `model` for records without usable price history.
    pub const fn with_model(mut self, model: VolatilityModel) -> Self {
        self.model = model;
        self
    }

    /// Update every eligible record under `dataset[class.key()]` in place.
    ///
    /// Fails with [`VolatilityError::MalformedDataset`] when the document
    /// does not have the expected nesting; `dataset` is then unchanged.
    pub fn update_asset_class<R: Rng + ?Sized>(
        &self,
        dataset: &mut Value,
        class: AssetClass,
        rng: &mut R,
    ) -> Result<ClassReport> {
        let key = class.key();
        let categories = dataset
            .as_object_mut()
            .ok_or_else(|| VolatilityError::malformed(key, "document root is not an object"))?
            .get_mut(key)
            .ok_or_else(|| VolatilityError::malformed(key, format!("missing \"{key}\" section")))?
            .as_object_mut()
            .ok_or_else(|| VolatilityError::malformed(key, format!("\"{key}\" is not an object")))?;

        let mut updated = categories.clone();
        let report = self.update_categories(&mut updated, class, rng)?;
        *categories = updated;
        Ok(report)
    }

    fn update_categories<R: Rng + ?Sized>(
        &self,
        categories: &mut Map<String, Value>,
        class: AssetClass,
        rng: &mut R,
    ) -> Result<ClassReport> {
        let mut report = ClassReport::default();

        for (category, symbols) in categories.iter_mut() {
            if !class.includes_category(category) {
                report.skipped_categories += 1;
                continue;
            }
            let symbols = symbols.as_object_mut().ok_or_else(|| {
                VolatilityError::malformed(class.key(), format!("category \"{category}\" is not an object"))
            })?;
            report.categories += 1;

            for (symbol, fields) in symbols.iter_mut() {
                let fields = fields.as_object_mut().ok_or_else(|| {
                    VolatilityError::malformed(
                        class.key(),
                        format!("record \"{category}/{symbol}\" is not an object"),
                    )
                })?;
                self.update_record(AssetRecord::new(fields), class, category, symbol, &mut report, rng);
            }
        }

        Ok(report)
    }

    fn update_record<R: Rng + ?Sized>(
        &self,
        mut record: AssetRecord<'_>,
        class: AssetClass,
        category: &str,
        symbol: &str,
        report: &mut ClassReport,
        rng: &mut R,
    ) {
        let price = record.price();
        if !price.is_quoted() {
            debug!(symbol, "no usable price, record left unchanged");
            report.unpriced += 1;
            return;
        }

        let profile = *self.table.lookup(record.category().unwrap_or(category));
        let prices;
        let estimator = match self.model {
            VolatilityModel::Synthetic => {
                prices = self.history.closing_prices(symbol);
                VolatilityEstimator::select(&prices)
            }
            VolatilityModel::Gaussian => match GaussianTable::builtin().lookup(class, category, symbol) {
                Some(gaussian) => VolatilityEstimator::Gaussian(*gaussian),
                None => {
                    debug!(symbol, category, "not covered by the gaussian model");
                    report.uncovered += 1;
                    return;
                }
            },
        };

        if let Some(pair) = estimator.estimate(price, &profile, rng) {
            debug!(
                symbol,
                strategy = %estimator.kind(),
                change_7d = pair.change_7d,
                change_30d = pair.change_30d,
                "volatility updated"
            );
            record.apply(pair);
            report.updated += 1;
            if estimator.kind() == EstimatorKind::Historical {
                report.historical += 1;
            }
        }
    }
}
