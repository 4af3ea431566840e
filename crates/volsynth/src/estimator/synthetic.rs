//! Synthetic volatility generator.
//!
//! Produces visually plausible 7-day and 30-day changes from a category
//! profile. Each horizon is sampled independently:
//!
//! 1. jitter `j ~ U(-random_factor, random_factor)`
//! 2. effective volatility `v = base * (1 + j)`
//! 3. direction `d ~ U(-1, 1)`
//! 4. change `= round(v * d * 100, 2)` percent
//!
//! The 30-day figure is not compounded from the 7-day figure.

use super::{ChangePair, Horizon, round_cents};
use crate::{profile::VolatilityProfile, record::Price};
use rand::Rng;

/// Category-parameterized random change generator.
///
/// Stateless; randomness comes from the caller's `Rng` so runs can be
/// reproduced with a seeded source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntheticGenerator;

impl SyntheticGenerator {
    /// Sample both horizons for an asset priced at `price`.
    ///
    /// Returns `None` for an unavailable price so the record stays as is.
    pub fn synthesize<R: Rng + ?Sized>(
        &self,
        price: Price,
        profile: &VolatilityProfile,
        rng: &mut R,
    ) -> Option<ChangePair> {
        price.value()?;

        let change_7d = self.sample_change(profile, Horizon::SevenDay, rng);
        let change_30d = self.sample_change(profile, Horizon::ThirtyDay, rng);
        Some(ChangePair {
            change_7d,
            change_30d,
        })
    }

    /// Sample one horizon's signed percentage change.
    pub fn sample_change<R: Rng + ?Sized>(
        &self,
        profile: &VolatilityProfile,
        horizon: Horizon,
        rng: &mut R,
    ) -> f64 {
        let random_factor = profile.random_factor;
        let jitter = rng.gen_range(-random_factor..=random_factor);
        let effective = profile.base_volatility(horizon) * (1.0 + jitter);
        let direction = rng.gen_range(-1.0..=1.0);

        let percent = effective * direction * 100.0;
        let rounded = round_cents(percent);

        // Rounding must not push the figure past the amplitude bound
        if rounded.abs() > profile.amplitude_bound(horizon) {
            (percent * 100.0).trunc() / 100.0
        } else {
            rounded
        }
    }
}
