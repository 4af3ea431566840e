//! Run configuration.
//!
//! Every field has a default, so an empty JSON object (or no file at all) is
//! a valid configuration.

use crate::{
    AssetClass, Result, VolatilityError,
    estimator::VolatilityModel,
    profile::{ProfileTable, VolatilityProfile},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// File names of the per-class datasets, relative to the data directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetFiles {
    /// Stocks dataset
    pub stocks: String,
    /// Cryptocurrencies dataset
    pub cryptocurrencies: String,
    /// Commodities dataset
    pub commodities: String,
    /// Indices dataset
    pub indices: String,
}

impl DatasetFiles {
    /// File name for `class`.
    pub fn get(&self, class: AssetClass) -> &str {
        match class {
            AssetClass::Stocks => &self.stocks,
            AssetClass::Cryptocurrencies => &self.cryptocurrencies,
            AssetClass::Commodities => &self.commodities,
            AssetClass::Indices => &self.indices,
        }
    }
}

impl Default for DatasetFiles {
    fn default() -> Self {
        Self {
            stocks: AssetClass::Stocks.default_file_name().to_string(),
            cryptocurrencies: AssetClass::Cryptocurrencies.default_file_name().to_string(),
            commodities: AssetClass::Commodities.default_file_name().to_string(),
            indices: AssetClass::Indices.default_file_name().to_string(),
        }
    }
}

/// Settings for a volatility run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolsynthConfig {
    /// Directory holding every dataset file
    pub data_dir: PathBuf,
    /// Per-class dataset file names
    pub datasets: DatasetFiles,
    /// Consolidated dataset file name
    pub consolidated_file: String,
    /// Profiles added to or replacing the built-in table
    pub profiles: BTreeMap<String, VolatilityProfile>,
    /// Optional JSON snapshot of closing prices per symbol
    pub history_file: Option<PathBuf>,
    /// Seed for reproducible runs
    pub seed: Option<u64>,
    /// Change model for records without usable price history
    pub model: VolatilityModel,
}

impl Default for VolsynthConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data/market-real-data"),
            datasets: DatasetFiles::default(),
            consolidated_file: "complete_market_data_88_assets.json".to_string(),
            profiles: BTreeMap::new(),
            history_file: None,
            seed: None,
            model: VolatilityModel::default(),
        }
    }
}

impl VolsynthConfig {
    /// Load configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => VolatilityError::MissingInput(path.to_path_buf()),
            _ => VolatilityError::io(path, e),
        })?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that profile overrides satisfy their invariants.
    pub fn validate(&self) -> Result<()> {
        self.profiles
            .iter()
            .try_for_each(|(category, profile)| profile.validate(category))
    }

    /// Built-in profile table with this configuration's overrides applied.
    pub fn profile_table(&self) -> Result<ProfileTable> {
        ProfileTable::builtin().with_overrides(&self.profiles)
    }

    /// Full path of the dataset for `class`.
    pub fn dataset_path(&self, class: AssetClass) -> PathBuf {
        self.data_dir.join(self.datasets.get(class))
    }

    /// Full path of the consolidated dataset.
    pub fn consolidated_path(&self) -> PathBuf {
        self.data_dir.join(&self.consolidated_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::fs;

    #[test]
    fn test_defaults() {
        let config = VolsynthConfig::default();
        assert_eq!(
            config.dataset_path(AssetClass::Stocks),
            PathBuf::from("data/market-real-data/stocks_complete_data.json")
        );
        assert_eq!(
            config.consolidated_path(),
            PathBuf::from("data/market-real-data/complete_market_data_88_assets.json")
        );
        assert_eq!(config.profile_table().unwrap(), *ProfileTable::builtin());
        assert_eq!(config.model, VolatilityModel::Synthetic);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("volsynth.json");
        fs::write(
            &path,
            r#"{
                "data_dir": "/srv/market",
                "datasets": {"indices": "idx.json"},
                "profiles": {"real_estate": {"base_volatility_7d": 0.01, "base_volatility_30d": 0.04, "random_factor": 0.05}},
                "seed": 17,
                "model": "gaussian"
            }"#,
        )
        .unwrap();

        let config = VolsynthConfig::load(&path).unwrap();
        assert_eq!(config.dataset_path(AssetClass::Indices), PathBuf::from("/srv/market/idx.json"));
        assert_eq!(config.datasets.commodities, "commodities_complete_data.json");
        assert_eq!(config.seed, Some(17));
        assert_eq!(config.model, VolatilityModel::Gaussian);

        let table = config.profile_table().unwrap();
        assert_relative_eq!(table.lookup("real_estate").base_volatility_30d, 0.04);
    }

    #[test]
    fn test_invalid_profile_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("volsynth.json");
        fs::write(
            &path,
            r#"{"profiles": {"odd": {"base_volatility_7d": 0.1, "base_volatility_30d": 0.05, "random_factor": 0.1}}}"#,
        )
        .unwrap();

        assert!(matches!(
            VolsynthConfig::load(&path),
            Err(VolatilityError::InvalidProfile { category, .. }) if category == "odd"
        ));
    }

    #[test]
    fn test_unknown_model_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("volsynth.json");
        fs::write(&path, r#"{"model": "garch"}"#).unwrap();

        assert!(matches!(VolsynthConfig::load(&path), Err(VolatilityError::Json(_))));
    }

    #[test]
    fn test_missing_config_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            VolsynthConfig::load(dir.path().join("nope.json")),
            Err(VolatilityError::MissingInput(_))
        ));
    }
}
