//! HTTP quote client against the price-vendor gateway.

use crate::{AssetClass, Instrument, QuoteError, QuoteResult, QuoteSource};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Configuration for the vendor quote endpoint.
#[derive(Debug, Clone)]
pub struct QuoteClientConfig {
    /// Base URL of the quote gateway, e.g. `https://quotes.internal`.
    pub base_url: String,
    /// Optional bearer token.
    pub api_key: Option<String>,
    /// Per-request timeout; expirations surface as `QuoteError::Unavailable`.
    pub timeout: Duration,
}

impl Default for QuoteClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8090".to_string(),
            api_key: None,
            timeout: Duration::from_secs(5),
        }
    }
}

impl QuoteClientConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> QuoteResult<Self> {
        let defaults = Self::default();
        let base_url = std::env::var("QUOTE_API_URL").unwrap_or(defaults.base_url);
        if base_url.is_empty() {
            return Err(QuoteError::Configuration(
                "QUOTE_API_URL cannot be empty".to_string(),
            ));
        }
        let timeout = match std::env::var("QUOTE_TIMEOUT_MS") {
            Ok(raw) => Duration::from_millis(raw.parse().map_err(|_| {
                QuoteError::Configuration(format!("invalid QUOTE_TIMEOUT_MS: {raw}"))
            })?),
            Err(_) => defaults.timeout,
        };
        Ok(Self {
            base_url,
            api_key: std::env::var("QUOTE_API_KEY").ok(),
            timeout,
        })
    }
}

#[derive(Debug, Deserialize)]
struct QuoteBody {
    price: f64,
}

/// Quote source backed by the vendor's REST endpoint.
pub struct HttpQuoteClient {
    client: reqwest::Client,
    config: QuoteClientConfig,
}

impl HttpQuoteClient {
    pub fn new(config: QuoteClientConfig) -> QuoteResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| QuoteError::Configuration(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/quote", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl QuoteSource for HttpQuoteClient {
    async fn current_price(&self, instrument: &Instrument) -> QuoteResult<Decimal> {
        let mut request = self.client.get(self.endpoint()).query(&[
            ("symbol", instrument.symbol.as_str()),
            ("class", instrument.asset_class.as_str()),
        ]);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                QuoteError::Unavailable(instrument.symbol.clone())
            } else {
                QuoteError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(QuoteError::Api {
                code: status.as_u16().to_string(),
                message: format!("quote lookup failed for {}", instrument.symbol),
            });
        }

        let body: QuoteBody = response
            .json()
            .await
            .map_err(|e| QuoteError::Network(e.to_string()))?;

        // Non-finite or non-positive vendor values are indistinguishable
        // from an outage for our purposes.
        if !body.price.is_finite() || body.price <= 0.0 {
            debug!(symbol = %instrument.symbol, price = body.price, "discarding unusable quote");
            return Err(QuoteError::Unavailable(instrument.symbol.clone()));
        }

        Decimal::from_f64_retain(body.price)
            .ok_or_else(|| QuoteError::Unavailable(instrument.symbol.clone()))
    }
}
