//! Cross-class orchestration.
//!
//! Runs the batch updater over stocks, cryptocurrencies, commodities and
//! indices, each as its own load → mutate → store cycle, then stamps the
//! consolidated dataset's metadata. A class that cannot be updated is
//! reported and skipped; the others still commit.

use crate::{
    AssetClass, Result, VolatilityError,
    batch::{BatchUpdater, ClassReport},
    config::VolsynthConfig,
    history::PriceHistoryProvider,
    profile::ProfileTable,
    store::DatasetFile,
};
use chrono::{DateTime, Utc};
use derive_more::Display;
use rand::Rng;
use serde_json::{Map, Value};
use tracing::{info, warn};

/// Format of `metadata.last_updated`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Format of `metadata.volatility_calculation_date`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Result of updating one asset class.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum ClassOutcome {
    /// Dataset rewritten with fresh figures
    #[display("updated {} records ({} from history, {} unpriced)", _0.updated, _0.historical, _0.unpriced)]
    Updated(ClassReport),
    /// Dataset file absent; nothing written
    #[display("dataset missing")]
    Missing,
    /// Dataset unreadable or malformed; nothing written
    #[display("failed: {_0}")]
    Failed(String),
}

/// Result of stamping the consolidated dataset.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum ConsolidatedOutcome {
    /// Metadata stamped at the given instant
    #[display("stamped at {}", _0.format(TIMESTAMP_FORMAT))]
    Stamped(DateTime<Utc>),
    /// Consolidated file absent; skipped
    #[display("dataset missing")]
    Missing,
    /// Consolidated file unreadable or malformed; left as it was
    #[display("failed: {_0}")]
    Failed(String),
}

/// Summary of a full run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Outcome per class, in run order
    pub classes: Vec<(AssetClass, ClassOutcome)>,
    /// Outcome of the consolidated metadata step
    pub consolidated: ConsolidatedOutcome,
}

impl RunReport {
    /// Outcome recorded for `class`.
    pub fn outcome(&self, class: AssetClass) -> Option<&ClassOutcome> {
        self.classes
            .iter()
            .find_map(|(c, outcome)| (*c == class).then_some(outcome))
    }

    /// Number of classes whose dataset was rewritten.
    pub fn updated_classes(&self) -> usize {
        self.classes
            .iter()
            .filter(|(_, outcome)| matches!(outcome, ClassOutcome::Updated(_)))
            .count()
    }

    /// Whether every class and the consolidated dataset were written.
    pub fn is_complete(&self) -> bool {
        self.updated_classes() == self.classes.len()
            && matches!(self.consolidated, ConsolidatedOutcome::Stamped(_))
    }
}

/// Sequences class updates and the consolidated metadata stamp.
#[derive(Debug)]
pub struct Orchestrator<'a, P: PriceHistoryProvider + ?Sized> {
    config: &'a VolsynthConfig,
    table: &'a ProfileTable,
    history: &'a P,
}

impl<'a, P: PriceHistoryProvider + ?Sized> Orchestrator<'a, P> {
    /// Create an orchestrator over the datasets named by `config`.
    pub const fn new(config: &'a VolsynthConfig, table: &'a ProfileTable, history: &'a P) -> Self {
        Self {
            config,
            table,
            history,
        }
    }

    /// Update every class and stamp the consolidated dataset with the
    /// current time.
    pub fn run<R: Rng + ?Sized>(&self, rng: &mut R) -> RunReport {
        self.run_at(Utc::now(), rng)
    }

    /// Like [`Self::run`] with an explicit timestamp.
    pub fn run_at<R: Rng + ?Sized>(&self, now: DateTime<Utc>, rng: &mut R) -> RunReport {
        info!(
            data_dir = %self.config.data_dir.display(),
            history = self.history.name(),
            model = %self.config.model,
            "volatility run started"
        );

        let classes = AssetClass::ALL
            .into_iter()
            .map(|class| (class, self.class_outcome(class, rng)))
            .collect();

        let consolidated = match self.stamp_consolidated(now) {
            Ok(()) => {
                info!("consolidated dataset stamped");
                ConsolidatedOutcome::Stamped(now)
            }
            Err(VolatilityError::MissingInput(path)) => {
                warn!(path = %path.display(), "consolidated dataset not found, skipping");
                ConsolidatedOutcome::Missing
            }
            Err(e) => {
                warn!(error = %e, "consolidated dataset not updated");
                ConsolidatedOutcome::Failed(e.to_string())
            }
        };

        RunReport {
            classes,
            consolidated,
        }
    }

    /// Load, update and store one class dataset.
    pub fn update_class<R: Rng + ?Sized>(&self, class: AssetClass, rng: &mut R) -> Result<ClassReport> {
        let updater = BatchUpdater::new(self.table, self.history).with_model(self.config.model);
        DatasetFile::update(self.config.dataset_path(class), |document| {
            updater.update_asset_class(document, class, rng)
        })
    }

    /// [`Self::update_class`] with every error reported and absorbed.
    pub fn class_outcome<R: Rng + ?Sized>(&self, class: AssetClass, rng: &mut R) -> ClassOutcome {
        match self.update_class(class, rng) {
            Ok(report) => {
                info!(
                    %class,
                    updated = report.updated,
                    historical = report.historical,
                    unpriced = report.unpriced,
                    uncovered = report.uncovered,
                    "class volatility updated"
                );
                ClassOutcome::Updated(report)
            }
            Err(VolatilityError::MissingInput(path)) => {
                warn!(%class, path = %path.display(), "dataset not found, skipping class");
                ClassOutcome::Missing
            }
            Err(e) => {
                warn!(%class, error = %e, "class update failed, dataset left untouched");
                ClassOutcome::Failed(e.to_string())
            }
        }
    }

    /// Stamp the consolidated dataset's metadata block.
    pub fn stamp_consolidated(&self, now: DateTime<Utc>) -> Result<()> {
        DatasetFile::update(self.config.consolidated_path(), |document| {
            stamp_metadata(document, now)
        })
    }
}

/// Mark `document` as carrying freshly computed volatility.
///
/// Creates the `metadata` block when absent and sets `last_updated`,
/// `volatility_calculated` and `volatility_calculation_date`; other metadata
/// keys are kept.
pub fn stamp_metadata(document: &mut Value, now: DateTime<Utc>) -> Result<()> {
    const SECTION: &str = "metadata";

    let root = document
        .as_object_mut()
        .ok_or_else(|| VolatilityError::malformed(SECTION, "document root is not an object"))?;
    let metadata = root
        .entry(SECTION)
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(|| VolatilityError::malformed(SECTION, "\"metadata\" is not an object"))?;

    metadata.insert(
        "last_updated".to_string(),
        Value::from(now.format(TIMESTAMP_FORMAT).to_string()),
    );
    metadata.insert("volatility_calculated".to_string(), Value::Bool(true));
    metadata.insert(
        "volatility_calculation_date".to_string(),
        Value::from(now.format(DATE_FORMAT).to_string()),
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{estimator::VolatilityModel, history::NoHistory};
    use chrono::{NaiveDateTime, TimeZone};
    use rand::{SeedableRng, rngs::StdRng};
    use serde_json::json;
    use std::fs;
    use std::path::Path;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 9, 30, 0).unwrap()
    }

    fn write_json(path: &Path, value: &Value) {
        fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
    }

    fn read_json(path: &Path) -> Value {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    fn config_for(dir: &Path) -> VolsynthConfig {
        VolsynthConfig {
            data_dir: dir.to_path_buf(),
            ..VolsynthConfig::default()
        }
    }

    #[test]
    fn test_stamp_metadata_creates_block() {
        let mut document = json!({"stocks": {}});
        stamp_metadata(&mut document, fixed_now()).unwrap();

        let metadata = &document["metadata"];
        assert_eq!(metadata["volatility_calculated"], json!(true));
        assert_eq!(metadata["last_updated"], json!("2024-03-15T09:30:00Z"));
        assert_eq!(metadata["volatility_calculation_date"], json!("2024-03-15"));

        let parsed = NaiveDateTime::parse_from_str(
            metadata["last_updated"].as_str().unwrap(),
            TIMESTAMP_FORMAT,
        );
        assert!(parsed.is_ok());
    }

    #[test]
    fn test_stamp_metadata_keeps_other_keys() {
        let mut document = json!({"metadata": {"total_assets": 88, "volatility_calculated": false}});
        stamp_metadata(&mut document, fixed_now()).unwrap();

        assert_eq!(document["metadata"]["total_assets"], json!(88));
        assert_eq!(document["metadata"]["volatility_calculated"], json!(true));
    }

    #[test]
    fn test_stamp_metadata_rejects_non_object() {
        assert!(stamp_metadata(&mut json!([1, 2]), fixed_now()).is_err());
        assert!(stamp_metadata(&mut json!({"metadata": "yesterday"}), fixed_now()).is_err());
    }

    #[test]
    fn test_full_run() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(dir.path());

        write_json(
            &config.dataset_path(AssetClass::Stocks),
            &json!({"stocks": {"technology": {"AAPL": {"price": 180, "category": "technology"}}}}),
        );
        write_json(
            &config.dataset_path(AssetClass::Cryptocurrencies),
            &json!({"cryptocurrencies": {"top_tier": {"BTC": {"price": 45000, "category": "top_tier"}}}}),
        );
        write_json(
            &config.dataset_path(AssetClass::Commodities),
            &json!({"commodities": {"precious_metals": {"GOLD": {"price": 2000.5, "category": "precious_metals"}}}}),
        );
        write_json(
            &config.dataset_path(AssetClass::Indices),
            &json!({"indices": {"asian": {"N225": {"price": "N/A", "category": "asian"}}}}),
        );
        write_json(&config.consolidated_path(), &json!({"assets": []}));

        let table = config.profile_table().unwrap();
        let report = Orchestrator::new(&config, &table, &NoHistory)
            .run_at(fixed_now(), &mut StdRng::seed_from_u64(21));

        assert!(report.is_complete());
        assert_eq!(report.updated_classes(), 4);
        assert_eq!(report.consolidated, ConsolidatedOutcome::Stamped(fixed_now()));

        let stocks = read_json(&config.dataset_path(AssetClass::Stocks));
        assert!(stocks["stocks"]["technology"]["AAPL"]["change_7d"].is_f64());
        let indices = read_json(&config.dataset_path(AssetClass::Indices));
        assert!(indices["indices"]["asian"]["N225"].get("change_7d").is_none());
        match report.outcome(AssetClass::Indices) {
            Some(ClassOutcome::Updated(class_report)) => assert_eq!(class_report.unpriced, 1),
            other => panic!("unexpected outcome: {other:?}"),
        }

        let consolidated = read_json(&config.consolidated_path());
        assert_eq!(consolidated["metadata"]["volatility_calculated"], json!(true));
        assert_eq!(consolidated["metadata"]["last_updated"], json!("2024-03-15T09:30:00Z"));
        assert_eq!(consolidated["assets"], json!([]));
    }

    #[test]
    fn test_gaussian_model_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = VolsynthConfig {
            model: VolatilityModel::Gaussian,
            ..config_for(dir.path())
        };
        write_json(
            &config.dataset_path(AssetClass::Stocks),
            &json!({"stocks": {"technology": {
                "NVDA": {"price": 450, "category": "technology"},
                "PLTR": {"price": 22, "category": "technology"}
            }}}),
        );

        let table = config.profile_table().unwrap();
        let report = Orchestrator::new(&config, &table, &NoHistory)
            .update_class(AssetClass::Stocks, &mut StdRng::seed_from_u64(2))
            .unwrap();

        assert_eq!((report.updated, report.uncovered), (1, 1));
        let stocks = read_json(&config.dataset_path(AssetClass::Stocks));
        assert!(stocks["stocks"]["technology"]["NVDA"]["change_30d"].is_f64());
        assert!(stocks["stocks"]["technology"]["PLTR"].get("change_30d").is_none());
    }

    #[test]
    fn test_partial_run_commits_what_it_can() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(dir.path());

        let stocks = json!({"stocks": {"banking": {"JPM": {"price": 150, "category": "banking"}}}});
        write_json(&config.dataset_path(AssetClass::Stocks), &stocks);
        // Malformed crypto dataset must survive byte-for-byte
        let broken = r#"{"cryptocurrencies": {"top_tier": ["BTC"]}}"#;
        fs::write(config.dataset_path(AssetClass::Cryptocurrencies), broken).unwrap();

        let table = config.profile_table().unwrap();
        let report = Orchestrator::new(&config, &table, &NoHistory)
            .run_at(fixed_now(), &mut StdRng::seed_from_u64(8));

        assert!(!report.is_complete());
        assert_eq!(report.updated_classes(), 1);
        assert!(matches!(report.outcome(AssetClass::Stocks), Some(ClassOutcome::Updated(_))));
        assert!(matches!(
            report.outcome(AssetClass::Cryptocurrencies),
            Some(ClassOutcome::Failed(_))
        ));
        assert_eq!(report.outcome(AssetClass::Commodities), Some(&ClassOutcome::Missing));
        assert_eq!(report.outcome(AssetClass::Indices), Some(&ClassOutcome::Missing));
        assert_eq!(report.consolidated, ConsolidatedOutcome::Missing);

        assert_eq!(
            fs::read_to_string(config.dataset_path(AssetClass::Cryptocurrencies)).unwrap(),
            broken
        );
        let updated = read_json(&config.dataset_path(AssetClass::Stocks));
        assert!(updated["stocks"]["banking"]["JPM"]["change_30d"].is_f64());
        assert!(!config.consolidated_path().exists());
    }

    #[test]
    fn test_outcome_display() {
        let report = ClassReport {
            updated: 3,
            historical: 1,
            unpriced: 2,
            ..ClassReport::default()
        };
        assert_eq!(
            ClassOutcome::Updated(report).to_string(),
            "updated 3 records (1 from history, 2 unpriced)"
        );
        assert_eq!(
            ConsolidatedOutcome::Stamped(fixed_now()).to_string(),
            "stamped at 2024-03-15T09:30:00Z"
        );
    }
}
