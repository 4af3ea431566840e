#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/volsynth/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod asset_class;
pub mod batch;
pub mod config;
pub mod error;
pub mod estimator;
pub mod history;
pub mod orchestrator;
pub mod profile;
pub mod record;
pub mod store;

// Re-export core types
pub use asset_class::AssetClass;
pub use batch::{BatchUpdater, ClassReport};
pub use config::{DatasetFiles, VolsynthConfig};
pub use error::{Result, VolatilityError};
pub use estimator::{
    ChangePair, EstimatorKind, GaussianProfile, GaussianTable, HistoricalEstimator, Horizon,
    SyntheticGenerator, VolatilityEstimator, VolatilityModel,
};
pub use history::{InMemoryHistory, NoHistory, PriceHistoryProvider, PriceSeries, SimulatedHistory};
pub use orchestrator::{ClassOutcome, ConsolidatedOutcome, Orchestrator, RunReport};
pub use profile::{DEFAULT_CATEGORY, ProfileTable, VolatilityProfile};
pub use record::{AssetRecord, Price};
pub use store::DatasetFile;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
