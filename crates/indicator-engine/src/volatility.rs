//! Volatility measures: ATR, ADX, Bollinger Bands, Keltner Channels, and the
//! Bollinger-inside-Keltner squeeze detector.

use crate::trend::ema;
use crate::{closes, Bar};
use serde::{Deserialize, Serialize};

/// Latest Wilder-smoothed average true range.
pub fn atr(bars: &[Bar], period: usize) -> Option<f64> {
    atr_series(bars, period).last().copied().flatten()
}

/// Per-bar ATR trajectory. True range needs the previous close, so the first
/// value lands at index `period` (period + 1 bars).
pub fn atr_series(bars: &[Bar], period: usize) -> Vec<Option<f64>> {
    let n = bars.len();
    if period == 0 || n < 2 {
        return vec![None; n];
    }
    let mut out = vec![None; n];
    let p = period as f64;
    let mut sum = 0.0;
    let mut atr = 0.0;
    for i in 1..n {
        let tr = true_range(&bars[i], bars[i - 1].close);
        if i < period {
            sum += tr;
        } else if i == period {
            sum += tr;
            atr = sum / p;
            out[i] = Some(atr);
        } else {
            atr = (atr * (p - 1.0) + tr) / p;
            out[i] = Some(atr);
        }
    }
    out
}

fn true_range(bar: &Bar, prev_close: f64) -> f64 {
    let hl = bar.high - bar.low;
    let hc = (bar.high - prev_close).abs();
    let lc = (bar.low - prev_close).abs();
    hl.max(hc).max(lc)
}

/// Latest average directional index. Needs `2 * period + 1` bars: one Wilder
/// seed for the directional movement sums, a second for the DX average.
pub fn adx(bars: &[Bar], period: usize) -> Option<f64> {
    let n = bars.len();
    if period == 0 || n < 2 * period + 1 {
        return None;
    }
    let p = period as f64;
    let mut tr_sum = 0.0;
    let mut plus_dm_sum = 0.0;
    let mut minus_dm_sum = 0.0;
    let mut dx_seen = 0usize;
    let mut dx_sum = 0.0;
    let mut adx = 0.0;

    for i in 1..n {
        let up = bars[i].high - bars[i - 1].high;
        let down = bars[i - 1].low - bars[i].low;
        let plus_dm = if up > down && up > 0.0 { up } else { 0.0 };
        let minus_dm = if down > up && down > 0.0 { down } else { 0.0 };
        let tr = true_range(&bars[i], bars[i - 1].close);

        if i <= period {
            tr_sum += tr;
            plus_dm_sum += plus_dm;
            minus_dm_sum += minus_dm;
            continue;
        }
        tr_sum = tr_sum - tr_sum / p + tr;
        plus_dm_sum = plus_dm_sum - plus_dm_sum / p + plus_dm;
        minus_dm_sum = minus_dm_sum - minus_dm_sum / p + minus_dm;

        let (plus_di, minus_di) = if tr_sum == 0.0 {
            (0.0, 0.0)
        } else {
            (100.0 * plus_dm_sum / tr_sum, 100.0 * minus_dm_sum / tr_sum)
        };
        let di_sum = plus_di + minus_di;
        let dx = if di_sum == 0.0 {
            0.0
        } else {
            100.0 * (plus_di - minus_di).abs() / di_sum
        };

        dx_seen += 1;
        if dx_seen < period {
            dx_sum += dx;
        } else if dx_seen == period {
            dx_sum += dx;
            adx = dx_sum / p;
        } else {
            adx = (adx * (p - 1.0) + dx) / p;
        }
    }

    if dx_seen >= period {
        Some(adx)
    } else {
        None
    }
}

/// Bollinger band triple.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerBands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

/// Bollinger Bands: SMA middle band, `sigma` population standard deviations
/// either side, over the trailing window.
pub fn bollinger(values: &[f64], period: usize, sigma: f64) -> Option<BollingerBands> {
    if period == 0 || values.len() < period {
        return None;
    }
    let window = &values[values.len() - period..];
    let middle = window.iter().sum::<f64>() / period as f64;
    let variance = window.iter().map(|v| (v - middle).powi(2)).sum::<f64>() / period as f64;
    let deviation = variance.sqrt();
    Some(BollingerBands {
        upper: middle + sigma * deviation,
        middle,
        lower: middle - sigma * deviation,
    })
}

/// Keltner channel triple.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeltnerChannel {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

/// Keltner Channels: EMA middle band, `multiplier` ATRs either side.
pub fn keltner(bars: &[Bar], period: usize, multiplier: f64) -> Option<KeltnerChannel> {
    let middle = ema(&closes(bars), period)?;
    let atr = atr(bars, period)?;
    Some(KeltnerChannel {
        upper: middle + multiplier * atr,
        middle,
        lower: middle - multiplier * atr,
    })
}

/// Squeeze detector output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Squeeze {
    pub in_squeeze: bool,
    pub strength: f64,
}

/// Bollinger-inside-Keltner compression test. Strength is
/// `100 * (1 - bb_width / kc_width)` while the bands are nested, else 0.
pub fn squeeze(bars: &[Bar], period: usize, bb_sigma: f64, kc_mult: f64) -> Option<Squeeze> {
    let bb = bollinger(&closes(bars), period, bb_sigma)?;
    let kc = keltner(bars, period, kc_mult)?;
    let nested = bb.upper < kc.upper && bb.lower > kc.lower;
    let strength = if nested {
        // Strict nesting implies kc width exceeds bb width, so the divisor
        // is positive.
        100.0 * (1.0 - (bb.upper - bb.lower) / (kc.upper - kc.lower))
    } else {
        0.0
    };
    Some(Squeeze {
        in_squeeze: nested,
        strength,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    const EPS: f64 = 1e-9;

    fn make_bars(rows: &[(f64, f64, f64)]) -> Vec<Bar> {
        rows.iter()
            .enumerate()
            .map(|(i, &(high, low, close))| Bar {
                timestamp: Utc.timestamp_opt(1_700_000_000 + i as i64 * 86_400, 0).unwrap(),
                open: close,
                high,
                low,
                close,
                volume: 1_000.0,
            })
            .collect()
    }

    fn flat_bars(count: usize, close: f64, range: f64) -> Vec<Bar> {
        make_bars(&vec![(close + range, close - range, close); count])
    }

    #[test]
    fn atr_seed_and_smoothing() {
        // Constant 2.0 true range: seed average is 2.0 and Wilder smoothing
        // holds it there.
        let bars = flat_bars(10, 100.0, 1.0);
        let series = atr_series(&bars, 3);
        assert!(series[2].is_none());
        assert!((series[3].unwrap() - 2.0).abs() < EPS);
        assert!((series[9].unwrap() - 2.0).abs() < EPS);
    }

    #[test]
    fn atr_gap_expands_true_range() {
        // Gap up: previous close 100, next bar trades 110-112.
        let bars = make_bars(&[
            (101.0, 99.0, 100.0),
            (101.0, 99.0, 100.0),
            (101.0, 99.0, 100.0),
            (112.0, 110.0, 111.0),
        ]);
        let series = atr_series(&bars, 3);
        // TRs: 2, 2, 12 -> seed (2+2+12)/3.
        assert!((series[3].unwrap() - 16.0 / 3.0).abs() < EPS);
    }

    #[test]
    fn atr_needs_period_plus_one() {
        let bars = flat_bars(14, 50.0, 1.0);
        assert!(atr(&bars, 14).is_none());
        let bars = flat_bars(15, 50.0, 1.0);
        assert!(atr(&bars, 14).is_some());
    }

    #[test]
    fn adx_warmup_boundary() {
        let rows: Vec<(f64, f64, f64)> = (0..40)
            .map(|i| {
                let base = 100.0 + (i as f64 * 0.45).sin() * 5.0;
                (base + 1.0, base - 1.0, base)
            })
            .collect();
        let bars = make_bars(&rows);
        assert!(adx(&bars[..28], 14).is_none());
        assert!(adx(&bars[..29], 14).is_some());
    }

    #[test]
    fn adx_strong_trend_reads_high() {
        let rows: Vec<(f64, f64, f64)> = (0..40)
            .map(|i| {
                let base = 100.0 + i as f64 * 2.0;
                (base + 1.0, base - 1.0, base)
            })
            .collect();
        let bars = make_bars(&rows);
        let value = adx(&bars, 14).unwrap();
        assert!(value > 50.0, "trending ADX was {value}");
        assert!(value <= 100.0);
    }

    #[test]
    fn bollinger_flat_series_collapses() {
        let values = [100.0; 20];
        let bands = bollinger(&values, 20, 2.0).unwrap();
        assert!((bands.upper - 100.0).abs() < EPS);
        assert!((bands.middle - 100.0).abs() < EPS);
        assert!((bands.lower - 100.0).abs() < EPS);
    }

    #[test]
    fn bollinger_known_deviation() {
        // Window [98, 102] repeated: mean 100, population stddev 2.
        let values: Vec<f64> = (0..20).map(|i| if i % 2 == 0 { 98.0 } else { 102.0 }).collect();
        let bands = bollinger(&values, 20, 2.0).unwrap();
        assert!((bands.middle - 100.0).abs() < EPS);
        assert!((bands.upper - 104.0).abs() < EPS);
        assert!((bands.lower - 96.0).abs() < EPS);
    }

    #[test]
    fn squeeze_detects_compression() {
        // Tight closes inside a wide high/low range: Bollinger collapses
        // while the ATR-driven Keltner stays wide.
        let rows: Vec<(f64, f64, f64)> = (0..40).map(|_| (105.0, 95.0, 100.0)).collect();
        let bars = make_bars(&rows);
        let squeeze = squeeze(&bars, 20, 2.0, 1.5).unwrap();
        assert!(squeeze.in_squeeze);
        assert!(squeeze.strength > 99.0);
    }

    #[test]
    fn squeeze_released_reports_zero_strength() {
        // A steady trend with tight bar ranges: the 20-bar close dispersion
        // dwarfs the ATR, pushing Bollinger outside Keltner.
        let rows: Vec<(f64, f64, f64)> = (0..40)
            .map(|i| {
                let close = 100.0 + i as f64 * 2.0;
                (close + 0.25, close - 0.25, close)
            })
            .collect();
        let bars = make_bars(&rows);
        let squeeze = squeeze(&bars, 20, 2.0, 1.5).unwrap();
        assert!(!squeeze.in_squeeze);
        assert!(squeeze.strength.abs() < EPS);
    }

    #[test]
    fn non_finite_input_propagates_without_panic() {
        let mut bars = flat_bars(30, 100.0, 1.0);
        bars[10].close = f64::NAN;
        let _ = atr(&bars, 14);
        let _ = adx(&bars, 14);
        let _ = bollinger(&closes(&bars), 20, 2.0);
    }
}
