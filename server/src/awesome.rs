//! AwesomeAPI quote provider client.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use cambio_rates::{CurrencyCode, QuoteProvider, RateError, RateResult};

const USER_AGENT: &str = concat!("cambio/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the AwesomeAPI economia quote service.
///
/// Two endpoints are used. `GET {base}/json/available/uniq` returns a JSON
/// object mapping currency codes to human-readable descriptions. `GET
/// {base}/json/last/{code}-{reference}` returns a JSON object keyed by the
/// concatenated pair (`"USDBRL"`) whose `bid` field is a decimal string; a 404
/// means the pair is not quoted.
pub struct AwesomeApiClient {
    base_url: String,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct QuotePayload {
    bid: String,
}

impl AwesomeApiClient {
    /// Create a client for the given base URL.
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }
}

#[async_trait]
impl QuoteProvider for AwesomeApiClient {
    fn name(&self) -> &str {
        "awesomeapi"
    }

    async fn list_currencies(&self) -> RateResult<HashMap<CurrencyCode, String>> {
        let url = format!("{}/json/available/uniq", self.base_url);
        debug!(url = %url, "listing available currencies");

        let response = self.http.get(&url).send().await.map_err(|e| {
            RateError::ProviderUnavailable(format!("currency listing request failed: {e}"))
        })?;

        if !response.status().is_success() {
            return Err(RateError::ProviderUnavailable(format!(
                "currency listing returned {}",
                response.status()
            )));
        }

        response
            .json::<HashMap<CurrencyCode, String>>()
            .await
            .map_err(|e| RateError::ProviderUnavailable(format!("malformed currency listing: {e}")))
    }

    async fn fetch_quote(
        &self,
        code: &CurrencyCode,
        reference: &CurrencyCode,
    ) -> RateResult<Option<f64>> {
        let url = format!("{}/json/last/{}-{}", self.base_url, code, reference);
        debug!(url = %url, "fetching quote");

        let response = self.http.get(&url).send().await.map_err(|e| {
            RateError::ProviderUnavailable(format!("quote request for {code} failed: {e}"))
        })?;

        // AwesomeAPI answers 404 for pairs it does not quote.
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(RateError::ProviderUnavailable(format!(
                "quote request for {code} returned {}",
                response.status()
            )));
        }

        let payload: HashMap<String, QuotePayload> = response.json().await.map_err(|e| {
            RateError::ProviderUnavailable(format!("malformed quote payload for {code}: {e}"))
        })?;

        let pair = format!("{code}{reference}");
        let quote = payload.get(&pair).ok_or_else(|| {
            RateError::ProviderUnavailable(format!("quote payload missing entry for {pair}"))
        })?;

        let bid = quote.bid.parse::<f64>().map_err(|e| {
            RateError::ProviderUnavailable(format!("unparsable bid {:?} for {pair}: {e}", quote.bid))
        })?;

        Ok(Some(bid))
    }
}
