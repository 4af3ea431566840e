//! Asset records inside a dataset document.
//!
//! Records are kept as JSON objects so that fields this crate does not know
//! about survive a load/store cycle untouched. [`AssetRecord`] is a typed
//! view over one such object.

use crate::estimator::{ChangePair, Horizon};
use serde_json::{Map, Value};

/// Record field holding the current price.
pub const PRICE_FIELD: &str = "price";

/// Record field holding the category key.
pub const CATEGORY_FIELD: &str = "category";

/// Price placeholder used by datasets for assets without a live quote.
pub const UNAVAILABLE_SENTINEL: &str = "N/A";

/// Current price of an asset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Price {
    /// Positive, finite quote
    Quoted(f64),
    /// Missing, zero, `"N/A"` or otherwise unusable
    Unavailable,
}

impl Price {
    /// Interpret a JSON price field.
    ///
    /// Numbers and numeric strings are accepted when positive and finite;
    /// everything else is unavailable.
    pub fn from_json(value: Option<&Value>) -> Self {
        let quote = match value {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) if s.trim() != UNAVAILABLE_SENTINEL => s.trim().parse().ok(),
            _ => None,
        };
        quote.map_or(Self::Unavailable, Self::from)
    }

    /// The quote, if available.
    pub const fn value(self) -> Option<f64> {
        match self {
            Self::Quoted(price) => Some(price),
            Self::Unavailable => None,
        }
    }

    /// Whether a usable quote is present.
    pub const fn is_quoted(self) -> bool {
        matches!(self, Self::Quoted(_))
    }
}

impl From<f64> for Price {
    fn from(price: f64) -> Self {
        if price.is_finite() && price > 0.0 {
            Self::Quoted(price)
        } else {
            Self::Unavailable
        }
    }
}

/// Mutable view over one asset's JSON object.
#[derive(Debug)]
pub struct AssetRecord<'a> {
    fields: &'a mut Map<String, Value>,
}

impl<'a> AssetRecord<'a> {
    /// Wrap a record object.
    pub const fn new(fields: &'a mut Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Current price.
    pub fn price(&self) -> Price {
        Price::from_json(self.fields.get(PRICE_FIELD))
    }

    /// Category key carried by the record itself.
    pub fn category(&self) -> Option<&str> {
        self.fields.get(CATEGORY_FIELD).and_then(Value::as_str)
    }

    /// Previously written change figure for `horizon`.
    pub fn change(&self, horizon: Horizon) -> Option<f64> {
        self.fields.get(horizon.field()).and_then(Value::as_f64)
    }

    /// Overwrite both change fields.
    ///
    /// Existing fields keep their position; new fields are appended.
    pub fn apply(&mut self, pair: ChangePair) {
        for horizon in Horizon::ALL {
            self.fields
                .insert(horizon.field().to_string(), Value::from(pair.get(horizon)));
        }
    }
}
