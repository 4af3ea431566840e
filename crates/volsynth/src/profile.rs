//! Volatility parameter table.
//!
//! Maps an asset category to the base 7-day and 30-day volatility the
//! synthetic generator scales from, and the jitter amplitude applied to those
//! bases. Lookup is total: unknown categories resolve to the default
//! ("technology") profile.

use crate::{Result, VolatilityError, estimator::Horizon};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

/// Category whose profile is used when a lookup misses.
pub const DEFAULT_CATEGORY: &str = "technology";

/// Per-category volatility configuration.
///
/// Base volatilities are fractions (0.025 = 2.5%).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolatilityProfile {
    /// Expected magnitude of the 7-day change
    pub base_volatility_7d: f64,
    /// Expected magnitude of the 30-day change
    pub base_volatility_30d: f64,
    /// Maximum proportional jitter applied to the base, in (0, 1]
    pub random_factor: f64,
}

impl VolatilityProfile {
    /// Create a profile from its three parameters.
    pub const fn new(base_volatility_7d: f64, base_volatility_30d: f64, random_factor: f64) -> Self {
        Self {
            base_volatility_7d,
            base_volatility_30d,
            random_factor,
        }
    }

    /// Base volatility for a horizon.
    pub const fn base_volatility(&self, horizon: Horizon) -> f64 {
        match horizon {
            Horizon::SevenDay => self.base_volatility_7d,
            Horizon::ThirtyDay => self.base_volatility_30d,
        }
    }

    /// Largest absolute percentage change the synthetic generator can emit
    /// for `horizon`: `base * (1 + random_factor) * 100`.
    pub fn amplitude_bound(&self, horizon: Horizon) -> f64 {
        self.base_volatility(horizon) * (1.0 + self.random_factor) * 100.0
    }

    /// Check positivity, the jitter range and `base_30d >= base_7d`.
    pub fn validate(&self, category: &str) -> Result<()> {
        let invalid = |reason: String| VolatilityError::InvalidProfile {
            category: category.to_string(),
            reason,
        };

        if !(self.base_volatility_7d.is_finite() && self.base_volatility_7d > 0.0) {
            return Err(invalid(format!(
                "base_volatility_7d must be positive, got {}",
                self.base_volatility_7d
            )));
        }
        if !(self.base_volatility_30d.is_finite() && self.base_volatility_30d > 0.0) {
            return Err(invalid(format!(
                "base_volatility_30d must be positive, got {}",
                self.base_volatility_30d
            )));
        }
        if !(self.random_factor > 0.0 && self.random_factor <= 1.0) {
            return Err(invalid(format!(
                "random_factor must lie in (0, 1], got {}",
                self.random_factor
            )));
        }
        if self.base_volatility_30d < self.base_volatility_7d {
            return Err(invalid(format!(
                "base_volatility_30d ({}) is below base_volatility_7d ({})",
                self.base_volatility_30d, self.base_volatility_7d
            )));
        }
        Ok(())
    }
}

const BUILTIN_PROFILES: [(&str, VolatilityProfile); 16] = [
    // Stocks
    ("technology", VolatilityProfile::new(0.025, 0.085, 0.15)),
    ("banking", VolatilityProfile::new(0.018, 0.065, 0.12)),
    ("healthcare", VolatilityProfile::new(0.022, 0.075, 0.13)),
    ("energy", VolatilityProfile::new(0.028, 0.095, 0.16)),
    ("retail", VolatilityProfile::new(0.020, 0.070, 0.14)),
    ("industrial", VolatilityProfile::new(0.025, 0.080, 0.15)),
    // Cryptocurrencies
    ("top_tier", VolatilityProfile::new(0.035, 0.120, 0.20)),
    ("defi_layer2", VolatilityProfile::new(0.045, 0.150, 0.25)),
    ("stablecoin", VolatilityProfile::new(0.002, 0.005, 0.01)),
    // Crypto datasets key this category in the plural
    ("stablecoins", VolatilityProfile::new(0.002, 0.005, 0.01)),
    // Commodities
    ("precious_metals", VolatilityProfile::new(0.015, 0.055, 0.10)),
    ("industrial_metals", VolatilityProfile::new(0.025, 0.085, 0.15)),
    ("agricultural", VolatilityProfile::new(0.020, 0.070, 0.13)),
    // Indices
    ("american", VolatilityProfile::new(0.012, 0.045, 0.08)),
    ("european", VolatilityProfile::new(0.013, 0.050, 0.09)),
    ("asian", VolatilityProfile::new(0.015, 0.055, 0.10)),
];

static BUILTIN: LazyLock<ProfileTable> = LazyLock::new(|| ProfileTable {
    profiles: BUILTIN_PROFILES
        .iter()
        .map(|(category, profile)| ((*category).to_string(), *profile))
        .collect(),
    default: BUILTIN_PROFILES[0].1,
});

/// Immutable category → profile mapping with a default fallback.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileTable {
    profiles: HashMap<String, VolatilityProfile>,
    default: VolatilityProfile,
}

impl ProfileTable {
    /// The built-in table, constructed once per process.
    pub fn builtin() -> &'static Self {
        &BUILTIN
    }

    /// Build a table from `(category, profile)` entries.
    ///
    /// `default_category` must be one of the entries. Every profile is
    /// validated.
    pub fn from_entries<I, S>(entries: I, default_category: &str) -> Result<Self>
    where
        I: IntoIterator<Item = (S, VolatilityProfile)>,
        S: Into<String>,
    {
        let mut profiles = HashMap::new();
        for (category, profile) in entries {
            let category = category.into();
            profile.validate(&category)?;
            profiles.insert(category, profile);
        }

        let default = *profiles
            .get(default_category)
            .ok_or_else(|| VolatilityError::InvalidProfile {
                category: default_category.to_string(),
                reason: "default category has no profile".to_string(),
            })?;

        Ok(Self { profiles, default })
    }

    /// Copy of this table with `overrides` added or replacing existing
    /// categories. The default profile follows an override of
    /// [`DEFAULT_CATEGORY`].
    pub fn with_overrides(&self, overrides: &BTreeMap<String, VolatilityProfile>) -> Result<Self> {
        let mut table = self.clone();
        for (category, profile) in overrides {
            profile.validate(category)?;
            if category == DEFAULT_CATEGORY {
                table.default = *profile;
            }
            table.profiles.insert(category.clone(), *profile);
        }
        Ok(table)
    }

    /// Resolve the profile for `category`, falling back to the default.
    pub fn lookup(&self, category: &str) -> &VolatilityProfile {
        self.profiles.get(category).unwrap_or(&self.default)
    }

    /// Whether `category` has its own entry.
    pub fn contains(&self, category: &str) -> bool {
        self.profiles.contains_key(category)
    }

    /// Profile substituted for unknown categories.
    pub const fn default_profile(&self) -> &VolatilityProfile {
        &self.default
    }

    /// Entries sorted by category name.
    pub fn entries(&self) -> Vec<(&str, &VolatilityProfile)> {
        let mut entries: Vec<_> = self
            .profiles
            .iter()
            .map(|(category, profile)| (category.as_str(), profile))
            .collect();
        entries.sort_by_key(|(category, _)| *category);
        entries
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Whether the table has no categories.
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl Default for ProfileTable {
    fn default() -> Self {
        Self::builtin().clone()
    }
}
