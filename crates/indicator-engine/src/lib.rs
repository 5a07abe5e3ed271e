//! Pure technical-indicator computation over ordered OHLCV bars.
//!
//! Every function in this crate is a pure mapping from a chronological bar
//! (or close-price) sequence to an indicator value. Insufficient history is a
//! normal outcome and is reported as `None`, never as an error; series
//! variants return one `Option` per input bar so downstream composites can
//! index into the full trajectory. Non-finite inputs propagate as NaN rather
//! than panicking, so a scan across many symbols survives one bad feed.
//!
//! Callers are responsible for feeding bars oldest-to-newest; the crate does
//! not sort.

pub mod momentum;
pub mod snapshot;
pub mod trend;
pub mod volatility;
pub mod volume;
pub mod warmup;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One OHLCV sample for a fixed time interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Extract the close series from a bar sequence.
pub fn closes(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

pub mod prelude {
    pub use super::momentum::{cci, rsi, rsi_series, stochastic, StochPoint};
    pub use super::snapshot::IndicatorSnapshot;
    pub use super::trend::{ema, ema_series, macd, macd_series, sma, sma_series, MacdPoint};
    pub use super::volatility::{
        adx, atr, atr_series, bollinger, keltner, squeeze, BollingerBands, KeltnerChannel, Squeeze,
    };
    pub use super::volume::{obv, session_vwap, vwap};
    pub use super::warmup::WarmupStatus;
    pub use super::{closes, Bar};
}
