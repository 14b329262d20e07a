//! Rate table assembly from provider quotes.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, info, instrument, warn};

use crate::currency::CurrencyCode;
use crate::error::{RateError, RateResult};
use crate::provider::QuoteProvider;
use crate::table::RateTable;

/// Assembles [`RateTable`] snapshots by fanning out one quote fetch per listed
/// currency against a [`QuoteProvider`].
pub struct RateTableBuilder {
    reference: CurrencyCode,
    provider: Arc<dyn QuoteProvider>,
}

impl RateTableBuilder {
    /// Create a builder for the given reference currency and provider.
    pub fn new(reference: CurrencyCode, provider: Arc<dyn QuoteProvider>) -> Self {
        Self {
            reference,
            provider,
        }
    }

    /// The reference currency this builder assembles tables around.
    pub fn reference(&self) -> &CurrencyCode {
        &self.reference
    }

    /// Fetch the currency universe and assemble a fresh table.
    ///
    /// Individual quote failures degrade the result instead of failing it: a
    /// currency whose fetch errors, returns no data, or returns an unusable
    /// value is left out of the table. The call fails only when the listing
    /// itself fails or the reference currency is not listed.
    #[instrument(skip(self), fields(provider = self.provider.name(), reference = %self.reference))]
    pub async fn make(&self) -> RateResult<RateTable> {
        let universe = self.provider.list_currencies().await?;
        if !universe.contains_key(&self.reference) {
            return Err(RateError::ReferenceNotListed(self.reference.clone()));
        }

        debug!(currencies = universe.len(), "fetching latest quotes");
        let fetches = universe
            .keys()
            .filter(|code| **code != self.reference)
            .map(|code| self.fetch_entry(code));
        let mut rates: HashMap<CurrencyCode, f64> =
            join_all(fetches).await.into_iter().flatten().collect();

        let skipped = universe.len() - 1 - rates.len();
        if rates.is_empty() && universe.len() > 1 {
            warn!("every quote fetch failed; table degrades to the reference alone");
        }
        info!(loaded = rates.len(), skipped, "currency quotes loaded");

        rates.insert(self.reference.clone(), 1.0);
        RateTable::new(self.reference.clone(), rates)
    }

    async fn fetch_entry(&self, code: &CurrencyCode) -> Option<(CurrencyCode, f64)> {
        match self.provider.fetch_quote(code, &self.reference).await {
            Ok(Some(rate)) if rate.is_finite() && rate > 0.0 => {
                debug!(code = %code, rate, "quote loaded");
                Some((code.clone(), rate))
            }
            Ok(Some(rate)) => {
                warn!(code = %code, rate, "discarding unusable quote");
                None
            }
            Ok(None) => {
                debug!(code = %code, "provider has no quote");
                None
            }
            Err(error) => {
                warn!(code = %code, error = %error, "quote fetch failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MockQuoteProvider;

    fn code(s: &str) -> CurrencyCode {
        CurrencyCode::new(s)
    }

    fn builder_with(provider: MockQuoteProvider) -> RateTableBuilder {
        RateTableBuilder::new(code("BRL"), Arc::new(provider))
    }

    #[tokio::test]
    async fn test_make_assembles_all_quotes() {
        let provider = MockQuoteProvider::new("test");
        provider.add_currency("BRL", "Brazilian Real");
        provider.set_quote("USD", 10.0);
        provider.set_quote("GBP", 15.0);

        let table = builder_with(provider).make().await.unwrap();

        assert_eq!(table.currency_count(), 3);
        assert_eq!(table.rate(&code("BRL")), Some(1.0));
        assert_eq!(table.rate(&code("USD")), Some(10.0));
        assert_eq!(table.rate(&code("GBP")), Some(15.0));
        assert_eq!(table.reference(), &code("BRL"));
    }

    #[tokio::test]
    async fn test_partial_failures_degrade_the_table() {
        let provider = MockQuoteProvider::new("test");
        provider.add_currency("BRL", "Brazilian Real");
        provider.set_quote("USD", 10.0);
        provider.add_currency("GBP", "Pound Sterling"); // listed, no quote
        provider.fail_quote("CAD", "timed out");

        let table = builder_with(provider).make().await.unwrap();

        assert_eq!(table.currency_count(), 2);
        assert!(table.contains(&code("USD")));
        assert!(!table.contains(&code("GBP")));
        assert!(!table.contains(&code("CAD")));
    }

    #[tokio::test]
    async fn test_unusable_quotes_are_skipped() {
        let provider = MockQuoteProvider::new("test");
        provider.add_currency("BRL", "Brazilian Real");
        provider.set_quote("USD", 10.0);
        provider.set_quote("XAG", 0.0);
        provider.set_quote("XAU", -2.0);
        provider.set_quote("BTC", f64::NAN);

        let table = builder_with(provider).make().await.unwrap();

        assert_eq!(table.currency_count(), 2);
        assert!(table.contains(&code("USD")));
    }

    #[tokio::test]
    async fn test_all_fetches_failing_still_builds() {
        let provider = MockQuoteProvider::new("test");
        provider.add_currency("BRL", "Brazilian Real");
        provider.fail_quote("USD", "timed out");
        provider.fail_quote("GBP", "timed out");

        let table = builder_with(provider).make().await.unwrap();

        assert_eq!(table.currency_count(), 1);
        assert_eq!(table.rate(&code("BRL")), Some(1.0));
    }

    #[tokio::test]
    async fn test_reference_missing_from_listing() {
        let provider = MockQuoteProvider::new("test");
        provider.set_quote("USD", 10.0);

        let err = builder_with(provider).make().await.unwrap_err();
        assert!(matches!(err, RateError::ReferenceNotListed(c) if c.as_str() == "BRL"));
    }

    #[tokio::test]
    async fn test_listing_failure_is_fatal() {
        let provider = MockQuoteProvider::new("test");
        provider.fail_listing("connection refused");

        let err = builder_with(provider).make().await.unwrap_err();
        assert!(matches!(err, RateError::ProviderUnavailable(_)));
    }

    #[tokio::test]
    async fn test_reference_quote_from_provider_is_ignored() {
        // The reference is pinned to 1.0 even if the provider also quotes it.
        let provider = MockQuoteProvider::new("test");
        provider.set_quote("BRL", 42.0);
        provider.set_quote("USD", 10.0);

        let table = builder_with(provider).make().await.unwrap();

        assert_eq!(table.rate(&code("BRL")), Some(1.0));
    }
}
