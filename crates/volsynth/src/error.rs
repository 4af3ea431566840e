//! Error types for volatility computations and dataset handling.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for volatility operations.
pub type Result<T> = std::result::Result<T, VolatilityError>;

/// Errors that can occur while computing or persisting volatility figures.
#[derive(Debug, Error)]
pub enum VolatilityError {
    /// Dataset file does not exist
    #[error("Dataset not found: {}", .0.display())]
    MissingInput(PathBuf),

    /// Dataset file exists but could not be read or written
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// File being accessed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Dataset does not have the class → category → symbol → record shape
    #[error("Malformed dataset for {class}: {reason}")]
    MalformedDataset {
        /// Asset class key being updated
        class: String,
        /// What was wrong with the document
        reason: String,
    },

    /// Volatility profile violates its invariants
    #[error("Invalid volatility profile for {category}: {reason}")]
    InvalidProfile {
        /// Category the profile was registered under
        category: String,
        /// Violated invariant
        reason: String,
    },

    /// Insufficient price history for the lookback window
    #[error("Insufficient data: need {required} prices, got {available}")]
    InsufficientData {
        /// Required number of prices
        required: usize,
        /// Available number of prices
        available: usize,
    },

    /// Price history provider could not produce a series
    #[error("Price history error from {provider}: {reason}")]
    History {
        /// Provider name
        provider: String,
        /// What went wrong
        reason: String,
    },

    /// Asset class name not recognized
    #[error("Unknown asset class: {0}")]
    UnknownAssetClass(String),

    /// Volatility model name not recognized
    #[error("Unknown volatility model: {0}")]
    UnknownModel(String),
}

impl VolatilityError {
    /// Build a [`VolatilityError::Io`] for `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Build a [`VolatilityError::MalformedDataset`].
    pub fn malformed(class: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedDataset {
            class: class.into(),
            reason: reason.into(),
        }
    }
}
