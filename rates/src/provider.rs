//! Quote provider trait and test double.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::currency::CurrencyCode;
use crate::error::RateResult;

/// Source of the currency universe and of reference-relative quotes.
///
/// `fetch_quote` distinguishes "the provider has no quote for this pair"
/// (`Ok(None)`) from a transport or protocol failure (`ProviderUnavailable`).
/// The table builder skips the former and logs the latter; neither aborts a
/// refresh on its own.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Get the provider name, used in logs.
    fn name(&self) -> &str;

    /// List every currency the provider knows, as code to description.
    async fn list_currencies(&self) -> RateResult<HashMap<CurrencyCode, String>>;

    /// Latest quote for `code` expressed in `reference`, if the provider has
    /// one.
    async fn fetch_quote(
        &self,
        code: &CurrencyCode,
        reference: &CurrencyCode,
    ) -> RateResult<Option<f64>>;
}

/// Scriptable in-memory provider for tests.
#[cfg(test)]
pub struct MockQuoteProvider {
    name: String,
    currencies: dashmap::DashMap<CurrencyCode, String>,
    quotes: dashmap::DashMap<CurrencyCode, f64>,
    broken_quotes: dashmap::DashMap<CurrencyCode, String>,
    stalled_quotes: dashmap::DashSet<CurrencyCode>,
    listing_failure: parking_lot::Mutex<Option<String>>,
}

#[cfg(test)]
impl MockQuoteProvider {
    /// Create a new mock provider.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            currencies: dashmap::DashMap::new(),
            quotes: dashmap::DashMap::new(),
            broken_quotes: dashmap::DashMap::new(),
            stalled_quotes: dashmap::DashSet::new(),
            listing_failure: parking_lot::Mutex::new(None),
        }
    }

    /// List a currency without giving it a quote.
    pub fn add_currency(&self, code: &str, description: &str) {
        self.currencies
            .insert(CurrencyCode::new(code), description.to_string());
    }

    /// Drop a currency from the listing.
    pub fn remove_currency(&self, code: &str) {
        self.currencies.remove(&CurrencyCode::new(code));
    }

    /// List a currency and give it a quote.
    pub fn set_quote(&self, code: &str, rate: f64) {
        self.add_currency(code, code);
        self.quotes.insert(CurrencyCode::new(code), rate);
    }

    /// List a currency whose quote fetch fails.
    pub fn fail_quote(&self, code: &str, message: &str) {
        self.add_currency(code, code);
        self.broken_quotes
            .insert(CurrencyCode::new(code), message.to_string());
    }

    /// List a currency whose quote fetch never resolves.
    pub fn stall_quote(&self, code: &str) {
        self.add_currency(code, code);
        self.stalled_quotes.insert(CurrencyCode::new(code));
    }

    /// Make listing calls fail.
    pub fn fail_listing(&self, message: &str) {
        *self.listing_failure.lock() = Some(message.to_string());
    }
}

#[cfg(test)]
#[async_trait]
impl QuoteProvider for MockQuoteProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn list_currencies(&self) -> RateResult<HashMap<CurrencyCode, String>> {
        use crate::error::RateError;

        if let Some(message) = self.listing_failure.lock().clone() {
            return Err(RateError::ProviderUnavailable(message));
        }
        Ok(self
            .currencies
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect())
    }

    async fn fetch_quote(
        &self,
        code: &CurrencyCode,
        _reference: &CurrencyCode,
    ) -> RateResult<Option<f64>> {
        use crate::error::RateError;

        if self.stalled_quotes.contains(code) {
            futures::future::pending::<()>().await;
        }
        if let Some(message) = self.broken_quotes.get(code) {
            return Err(RateError::ProviderUnavailable(message.value().clone()));
        }
        Ok(self.quotes.get(code).map(|rate| *rate))
    }
}
