//! Quote lookup for open-position evaluation.
//!
//! Provides instrument normalization per asset class and the `QuoteSource`
//! trait the lifecycle engine consumes. The engine treats every failure mode
//! here (slow vendor, non-finite price, vendor outage) as "unavailable this
//! cycle", never fatal.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub mod http;

pub use http::{HttpQuoteClient, QuoteClientConfig};

/// Quote lookup error types
#[derive(Error, Debug)]
pub enum QuoteError {
    #[error("quote unavailable for {0}")]
    Unavailable(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("vendor API error: {code} - {message}")]
    Api { code: String, message: String },

    #[error("configuration error: {0}")]
    Configuration(String),
}

pub type QuoteResult<T> = Result<T, QuoteError>;

/// Asset class of a journaled instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetClass {
    Equity,
    Crypto,
    Forex,
}

impl AssetClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetClass::Equity => "equity",
            AssetClass::Crypto => "crypto",
            AssetClass::Forex => "forex",
        }
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetClass {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "equity" | "stock" => Ok(AssetClass::Equity),
            "crypto" => Ok(AssetClass::Crypto),
            "forex" | "fx" => Ok(AssetClass::Forex),
            other => Err(QuoteError::Configuration(format!(
                "unknown asset class: {other}"
            ))),
        }
    }
}

/// Quote-currency suffixes stripped from crypto symbols, longest first so
/// "USDT" wins over "USD".
const CRYPTO_QUOTE_SUFFIXES: [&str; 6] = ["USDT", "USDC", "BUSD", "USD", "EUR", "GBP"];

/// A vendor-lookup key normalized per asset class.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Instrument {
    /// Normalized lookup symbol, e.g. `BTC`, `EUR/USD`, `AAPL`.
    pub symbol: String,
    pub asset_class: AssetClass,
    pub base: Option<String>,
    pub quote: Option<String>,
}

impl Instrument {
    /// Normalize a raw journal symbol:
    /// crypto strips separators and quote-currency suffixes, forex splits
    /// into base/quote, equities pass through uppercased.
    pub fn normalize(raw: &str, asset_class: AssetClass) -> Self {
        let upper = raw.trim().to_ascii_uppercase();
        match asset_class {
            AssetClass::Equity => Self {
                symbol: upper,
                asset_class,
                base: None,
                quote: None,
            },
            AssetClass::Crypto => {
                let compact: String = upper.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
                let stripped = CRYPTO_QUOTE_SUFFIXES.iter().find_map(|suffix| {
                    compact
                        .strip_suffix(suffix)
                        .filter(|base| !base.is_empty())
                        .map(|base| (base.to_string(), suffix.to_string()))
                });
                match stripped {
                    Some((base, quote)) => Self {
                        symbol: base.clone(),
                        asset_class,
                        base: Some(base),
                        quote: Some(quote),
                    },
                    None => Self {
                        symbol: compact.clone(),
                        asset_class,
                        base: Some(compact),
                        quote: None,
                    },
                }
            }
            AssetClass::Forex => {
                let compact: String = upper.chars().filter(|c| c.is_ascii_alphabetic()).collect();
                if compact.len() == 6 {
                    let base = compact[..3].to_string();
                    let quote = compact[3..].to_string();
                    Self {
                        symbol: format!("{base}/{quote}"),
                        asset_class,
                        base: Some(base),
                        quote: Some(quote),
                    }
                } else {
                    // Not a recognizable pair; pass through rather than guess.
                    Self {
                        symbol: upper,
                        asset_class,
                        base: None,
                        quote: None,
                    }
                }
            }
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.symbol, self.asset_class)
    }
}

/// A source of current prices. Implementations must bound their own request
/// time; callers additionally wrap lookups in a cycle-level timeout.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn current_price(&self, instrument: &Instrument) -> QuoteResult<Decimal>;
}
