//! Immutable exchange-rate snapshot and conversion arithmetic.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::currency::CurrencyCode;
use crate::error::{ConversionSide, RateError, RateResult};

/// An immutable mapping of currency codes to their value expressed in a single
/// reference currency.
///
/// Because every rate shares the same reference, any-to-any conversion is two
/// table lookups and one multiply-divide; no pairwise rate matrix is kept. A
/// table is never mutated after construction: each refresh builds a fresh one
/// and readers holding the old snapshot keep a consistent view until they drop
/// it.
#[derive(Debug, Clone)]
pub struct RateTable {
    reference: CurrencyCode,
    rates: HashMap<CurrencyCode, f64>,
    built_at: DateTime<Utc>,
}

impl RateTable {
    /// Build a table from a reference currency and a rate mapping.
    ///
    /// The reference must be a key of `rates` with value exactly 1.0, and
    /// every rate must be a positive finite number.
    pub fn new(reference: CurrencyCode, rates: HashMap<CurrencyCode, f64>) -> RateResult<Self> {
        let reference_rate = *rates
            .get(&reference)
            .ok_or_else(|| RateError::InvalidReference(reference.clone()))?;
        if reference_rate != 1.0 {
            return Err(RateError::InvalidReferenceValue {
                code: reference,
                value: reference_rate,
            });
        }
        for (code, value) in &rates {
            if !value.is_finite() || *value <= 0.0 {
                return Err(RateError::InvalidRate {
                    code: code.clone(),
                    value: *value,
                });
            }
        }

        Ok(Self {
            reference,
            rates,
            built_at: Utc::now(),
        })
    }

    /// Convert `amount` of one currency into another.
    ///
    /// Both codes must be listed in this table; an unlisted code fails with
    /// [`RateError::UnknownCurrency`] naming the side it appeared on.
    pub fn convert(&self, from: &CurrencyCode, to: &CurrencyCode, amount: f64) -> RateResult<f64> {
        let from_rate = self.rate(from).ok_or_else(|| RateError::UnknownCurrency {
            side: ConversionSide::From,
            code: from.clone(),
        })?;
        let to_rate = self.rate(to).ok_or_else(|| RateError::UnknownCurrency {
            side: ConversionSide::To,
            code: to.clone(),
        })?;
        Ok(from_rate * amount / to_rate)
    }

    /// All currency codes this table can convert between, sorted.
    pub fn currencies(&self) -> Vec<CurrencyCode> {
        let mut codes: Vec<CurrencyCode> = self.rates.keys().cloned().collect();
        codes.sort();
        codes
    }

    /// The currency every rate is expressed in.
    pub fn reference(&self) -> &CurrencyCode {
        &self.reference
    }

    /// Rate for a single currency, if listed.
    pub fn rate(&self, code: &CurrencyCode) -> Option<f64> {
        self.rates.get(code).copied()
    }

    /// Whether a currency is listed in this table.
    pub fn contains(&self, code: &CurrencyCode) -> bool {
        self.rates.contains_key(code)
    }

    /// Number of listed currencies, the reference included. Always at least 1.
    pub fn currency_count(&self) -> usize {
        self.rates.len()
    }

    /// When this snapshot was built.
    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    /// Age of this snapshot.
    pub fn age(&self) -> Duration {
        Utc::now().signed_duration_since(self.built_at)
    }
}
