//! Best-effort aggregate of the standard indicator set for one symbol.

use crate::momentum::{cci, rsi, stochastic};
use crate::trend::{ema, macd, sma};
use crate::volatility::{adx, atr, bollinger, squeeze, Squeeze};
use crate::volume::{obv, session_vwap, vwap};
use crate::{closes, Bar};
use serde::{Deserialize, Serialize};

/// Sparse record of the standard indicator values. A field is present only
/// once its warm-up is satisfied; absence is the "not yet computable" signal,
/// never a stand-in zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsi14: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macd_line: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macd_signal: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macd_histogram: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ema20: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ema50: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ema200: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sma200: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub atr14: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adx14: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bb_upper: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bb_middle: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bb_lower: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stoch_k: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stoch_d: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cci20: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub obv: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vwap: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_vwap: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub squeeze: Option<Squeeze>,
}

impl IndicatorSnapshot {
    /// Compute the standard set over a chronological bar sequence. Each
    /// underlying series is computed exactly once; there is no per-bar
    /// recomputation loop.
    pub fn compute(bars: &[Bar]) -> Self {
        let close_series = closes(bars);
        let macd_point = macd(&close_series, 12, 26, 9);
        let bands = bollinger(&close_series, 20, 2.0);
        let stoch_point = stochastic(bars, 14, 3);
        Self {
            rsi14: rsi(&close_series, 14),
            macd_line: macd_point.map(|p| p.line),
            macd_signal: macd_point.and_then(|p| p.signal),
            macd_histogram: macd_point.and_then(|p| p.histogram),
            ema20: ema(&close_series, 20),
            ema50: ema(&close_series, 50),
            ema200: ema(&close_series, 200),
            sma200: sma(&close_series, 200),
            atr14: atr(bars, 14),
            adx14: adx(bars, 14),
            bb_upper: bands.map(|b| b.upper),
            bb_middle: bands.map(|b| b.middle),
            bb_lower: bands.map(|b| b.lower),
            stoch_k: stoch_point.map(|p| p.k),
            stoch_d: stoch_point.map(|p| p.d),
            cci20: cci(bars, 20),
            obv: obv(bars),
            vwap: vwap(bars, 20),
            session_vwap: session_vwap(bars),
            squeeze: squeeze(bars, 20, 2.0, 1.5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn make_bars(count: usize) -> Vec<Bar> {
        (0..count)
            .map(|i| {
                let close = 100.0 + (i as f64 * 0.4).sin() * 4.0;
                Bar {
                    timestamp: Utc
                        .timestamp_opt(1_700_000_000 + i as i64 * 86_400, 0)
                        .unwrap(),
                    open: close - 0.2,
                    high: close + 1.0,
                    low: close - 1.0,
                    close,
                    volume: 10_000.0,
                }
            })
            .collect()
    }

    #[test]
    fn short_history_yields_sparse_snapshot() {
        let snapshot = IndicatorSnapshot::compute(&make_bars(10));
        assert!(snapshot.rsi14.is_none());
        assert!(snapshot.macd_line.is_none());
        assert!(snapshot.ema200.is_none());
        assert!(snapshot.squeeze.is_none());
        // OBV and session VWAP are defined from the first bar.
        assert!(snapshot.obv.is_some());
        assert!(snapshot.session_vwap.is_some());
    }

    #[test]
    fn full_history_populates_core_fields() {
        let snapshot = IndicatorSnapshot::compute(&make_bars(60));
        assert!(snapshot.rsi14.is_some());
        assert!(snapshot.macd_line.is_some());
        assert!(snapshot.macd_signal.is_some());
        assert!(snapshot.macd_histogram.is_some());
        assert!(snapshot.atr14.is_some());
        assert!(snapshot.adx14.is_some());
        assert!(snapshot.bb_upper.is_some());
        assert!(snapshot.stoch_k.is_some());
        assert!(snapshot.cci20.is_some());
        assert!(snapshot.vwap.is_some());
        assert!(snapshot.squeeze.is_some());
        // 200-bar averages still warming up.
        assert!(snapshot.ema200.is_none());
        assert!(snapshot.sma200.is_none());
    }

    #[test]
    fn absent_fields_are_omitted_from_json() {
        let snapshot = IndicatorSnapshot::compute(&make_bars(5));
        let json = serde_json::to_value(&snapshot).unwrap();
        let object = json.as_object().unwrap();
        assert!(!object.contains_key("rsi14"));
        assert!(object.contains_key("obv"));
    }

    #[test]
    fn camel_case_wire_names() {
        let snapshot = IndicatorSnapshot::compute(&make_bars(60));
        let json = serde_json::to_value(&snapshot).unwrap();
        let object = json.as_object().unwrap();
        assert!(object.contains_key("macdLine"));
        assert!(object.contains_key("bbUpper"));
        assert!(object.contains_key("stochK"));
        assert!(object.contains_key("sessionVwap"));
        assert!(object["squeeze"].as_object().unwrap().contains_key("inSqueeze"));
    }

    #[test]
    fn identical_input_identical_snapshot() {
        let bars = make_bars(70);
        assert_eq!(
            IndicatorSnapshot::compute(&bars),
            IndicatorSnapshot::compute(&bars)
        );
    }

    #[test]
    fn readiness_never_regresses_as_bars_accumulate() {
        // Growing prefixes of the same data: once an indicator becomes
        // computable it must stay computable.
        let bars = make_bars(80);
        let mut seen = [false; 5];
        for n in 1..=bars.len() {
            let snapshot = IndicatorSnapshot::compute(&bars[..n]);
            let now = [
                snapshot.rsi14.is_some(),
                snapshot.macd_histogram.is_some(),
                snapshot.atr14.is_some(),
                snapshot.adx14.is_some(),
                snapshot.squeeze.is_some(),
            ];
            for (was, is) in seen.iter().zip(now.iter()) {
                assert!(!was || *is, "indicator readiness regressed at {n} bars");
            }
            seen = now;
        }
    }
}
