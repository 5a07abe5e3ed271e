//! Oscillators: RSI, Stochastic, CCI.

use crate::Bar;
use serde::{Deserialize, Serialize};

/// Latest Wilder RSI over the sequence.
pub fn rsi(values: &[f64], period: usize) -> Option<f64> {
    rsi_series(values, period).last().copied().flatten()
}

/// Per-bar Wilder RSI trajectory.
///
/// The running average gain/loss is carried forward as explicit state through
/// the whole recurrence. Reconstructing a prior average by inverting the RSI
/// formula from a single RSI value drifts and must not be reintroduced.
pub fn rsi_series(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let n = values.len();
    if period == 0 || n < 2 {
        return vec![None; n];
    }
    let mut out = vec![None; n];
    let p = period as f64;
    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for i in 1..n {
        let change = values[i] - values[i - 1];
        let gain = if change > 0.0 { change } else { 0.0 };
        let loss = if change < 0.0 { -change } else { 0.0 };
        if i < period {
            avg_gain += gain;
            avg_loss += loss;
        } else if i == period {
            // First average: simple mean over the first `period` changes.
            avg_gain = (avg_gain + gain) / p;
            avg_loss = (avg_loss + loss) / p;
            out[i] = Some(rsi_from_averages(avg_gain, avg_loss));
        } else {
            avg_gain = (avg_gain * (p - 1.0) + gain) / p;
            avg_loss = (avg_loss * (p - 1.0) + loss) / p;
            out[i] = Some(rsi_from_averages(avg_gain, avg_loss));
        }
    }
    out
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

/// One stochastic-oscillator sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StochPoint {
    pub k: f64,
    pub d: f64,
}

/// Latest stochastic %K/%D. %K is the raw position of the close inside the
/// trailing high/low window; %D smooths %K with a `smoothing`-bar mean.
pub fn stochastic(bars: &[Bar], period: usize, smoothing: usize) -> Option<StochPoint> {
    let n = bars.len();
    if period == 0 || smoothing == 0 || n < period + smoothing - 1 {
        return None;
    }

    let mut k_values = Vec::with_capacity(n - period + 1);
    for i in period - 1..n {
        let window = &bars[i + 1 - period..=i];
        let highest = window.iter().fold(f64::MIN, |a, b| a.max(b.high));
        let lowest = window.iter().fold(f64::MAX, |a, b| a.min(b.low));
        let range = highest - lowest;
        let k = if range == 0.0 {
            50.0
        } else {
            (bars[i].close - lowest) / range * 100.0
        };
        k_values.push(k);
    }

    let k = *k_values.last()?;
    let tail = &k_values[k_values.len() - smoothing..];
    let d = tail.iter().sum::<f64>() / smoothing as f64;
    Some(StochPoint { k, d })
}

/// Commodity Channel Index over the trailing window.
pub fn cci(bars: &[Bar], period: usize) -> Option<f64> {
    if period == 0 || bars.len() < period {
        return None;
    }
    let window = &bars[bars.len() - period..];
    let typical: Vec<f64> = window
        .iter()
        .map(|b| (b.high + b.low + b.close) / 3.0)
        .collect();
    let mean = typical.iter().sum::<f64>() / period as f64;
    let mean_deviation = typical.iter().map(|t| (t - mean).abs()).sum::<f64>() / period as f64;
    let last = *typical.last()?;
    if mean_deviation == 0.0 {
        Some(0.0)
    } else {
        Some((last - mean) / (0.015 * mean_deviation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    const EPS: f64 = 1e-9;

    fn make_bars(closes: &[f64]) -> Vec<Bar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                timestamp: Utc.timestamp_opt(1_700_000_000 + i as i64 * 86_400, 0).unwrap(),
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1_000.0,
            })
            .collect()
    }

    #[test]
    fn rsi_golden_fixture() {
        // Hand-computed Wilder RSI-3 over a small sequence. The values after
        // the seed require the running averages to be carried forward; the
        // formula-inversion shortcut produces different numbers at index 5+.
        let closes = [10.0, 11.0, 10.5, 11.5, 12.5, 12.0, 13.0];
        let series = rsi_series(&closes, 3);

        assert!(series[0].is_none());
        assert!(series[1].is_none());
        assert!(series[2].is_none());
        assert!((series[3].unwrap() - 80.0).abs() < EPS);
        assert!((series[4].unwrap() - 87.5).abs() < EPS);
        assert!((series[5].unwrap() - 100.0 * 28.0 / 41.0).abs() < EPS);
        assert!((series[6].unwrap() - 100.0 * 55.0 / 68.0).abs() < EPS);
    }

    #[test]
    fn rsi_first_value_needs_period_plus_one_bars() {
        let closes: Vec<f64> = (0..16).map(|i| 100.0 + (i % 3) as f64).collect();
        let series = rsi_series(&closes, 14);
        assert!(series[13].is_none());
        assert!(series[14].is_some());
    }

    #[test]
    fn rsi_all_gains_is_pegged_at_100() {
        let closes: Vec<f64> = (0..10).map(|i| 100.0 + i as f64).collect();
        let value = rsi(&closes, 5).unwrap();
        assert!((value - 100.0).abs() < EPS);
    }

    #[test]
    fn rsi_all_losses_is_zero() {
        let closes: Vec<f64> = (0..10).map(|i| 100.0 - i as f64).collect();
        let value = rsi(&closes, 5).unwrap();
        assert!(value.abs() < EPS);
    }

    #[test]
    fn rsi_stays_in_range() {
        let closes: Vec<f64> = (0..50)
            .map(|i| 100.0 + ((i * 7) % 13) as f64 - 6.0)
            .collect();
        for value in rsi_series(&closes, 14).into_iter().flatten() {
            assert!((0.0..=100.0).contains(&value), "RSI {value} out of range");
        }
    }

    #[test]
    fn rsi_deterministic() {
        let closes: Vec<f64> = (0..40).map(|i| (i as f64 * 0.9).sin() * 5.0 + 50.0).collect();
        assert_eq!(rsi_series(&closes, 14), rsi_series(&closes, 14));
    }

    #[test]
    fn stochastic_flat_window_is_midpoint() {
        let bars: Vec<Bar> = make_bars(&[50.0; 20])
            .into_iter()
            .map(|mut b| {
                b.high = 50.0;
                b.low = 50.0;
                b
            })
            .collect();
        let point = stochastic(&bars, 14, 3).unwrap();
        assert!((point.k - 50.0).abs() < EPS);
        assert!((point.d - 50.0).abs() < EPS);
    }

    #[test]
    fn stochastic_close_at_window_high() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let mut bars = make_bars(&closes);
        for b in &mut bars {
            b.high = b.close;
            b.low = b.close - 2.0;
        }
        let point = stochastic(&bars, 14, 3).unwrap();
        assert!((point.k - 100.0).abs() < EPS);
        assert!(point.d > 99.0);
    }

    #[test]
    fn stochastic_needs_window_plus_smoothing() {
        let bars = make_bars(&[1.0; 15]);
        assert!(stochastic(&bars, 14, 3).is_none());
        let bars = make_bars(&[1.0; 16]);
        assert!(stochastic(&bars, 14, 3).is_some());
    }

    #[test]
    fn cci_zero_deviation_window() {
        let bars = make_bars(&[100.0; 25]);
        assert_eq!(cci(&bars, 20), Some(0.0));
    }

    #[test]
    fn cci_signs_follow_displacement() {
        let mut closes = vec![100.0; 24];
        closes.push(110.0);
        let bars = make_bars(&closes);
        assert!(cci(&bars, 20).unwrap() > 0.0);

        let mut closes = vec![100.0; 24];
        closes.push(90.0);
        let bars = make_bars(&closes);
        assert!(cci(&bars, 20).unwrap() < 0.0);
    }
}
