//! Moving averages and MACD.
//!
//! EMA seeds with the simple average of the first `period` values, then
//! follows `ema = close*k + prev*(1-k)` with `k = 2/(period+1)`. The series
//! variants expose the full per-bar trajectory; MACD and the squeeze detector
//! consume the historical path, not just the latest value.

use serde::{Deserialize, Serialize};

/// Simple moving average of the trailing `period` values.
pub fn sma(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }
    let window = &values[values.len() - period..];
    Some(window.iter().sum::<f64>() / period as f64)
}

/// Per-bar SMA trajectory, `None` until the window is full.
pub fn sma_series(values: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; values.len()];
    }
    let mut out = Vec::with_capacity(values.len());
    let mut sum = 0.0;
    for (i, &v) in values.iter().enumerate() {
        sum += v;
        if i + 1 > period {
            sum -= values[i - period];
        }
        out.push(if i + 1 >= period {
            Some(sum / period as f64)
        } else {
            None
        });
    }
    out
}

/// Exponential moving average of the whole sequence.
pub fn ema(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }
    let k = 2.0 / (period as f64 + 1.0);
    let mut ema = values[..period].iter().sum::<f64>() / period as f64;
    for &v in &values[period..] {
        ema = v * k + ema * (1.0 - k);
    }
    Some(ema)
}

/// Per-bar EMA trajectory, `None` during the seed window.
pub fn ema_series(values: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; values.len()];
    }
    let k = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut ema = 0.0;
    let mut sum = 0.0;
    for (i, &v) in values.iter().enumerate() {
        if i + 1 < period {
            sum += v;
            out.push(None);
        } else if i + 1 == period {
            sum += v;
            ema = sum / period as f64;
            out.push(Some(ema));
        } else {
            ema = v * k + ema * (1.0 - k);
            out.push(Some(ema));
        }
    }
    out
}

/// One MACD sample. `signal` and `histogram` stay `None` until the signal
/// EMA has consumed its own warm-up of valid MACD values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdPoint {
    pub line: f64,
    pub signal: Option<f64>,
    pub histogram: Option<f64>,
}

/// Latest MACD sample.
pub fn macd(values: &[f64], fast: usize, slow: usize, signal: usize) -> Option<MacdPoint> {
    macd_series(values, fast, slow, signal)
        .last()
        .copied()
        .flatten()
}

/// Per-bar MACD trajectory.
///
/// The signal line is a seeded EMA over the sequence of valid MACD values;
/// its index advances on every valid MACD value, whether or not the signal
/// itself is warm yet.
pub fn macd_series(
    values: &[f64],
    fast: usize,
    slow: usize,
    signal: usize,
) -> Vec<Option<MacdPoint>> {
    if fast == 0 || slow == 0 || signal == 0 {
        return vec![None; values.len()];
    }
    let fast_series = ema_series(values, fast);
    let slow_series = ema_series(values, slow);

    let k = 2.0 / (signal as f64 + 1.0);
    let mut seen = 0usize;
    let mut seed_sum = 0.0;
    let mut sig = 0.0;

    let mut out = vec![None; values.len()];
    for i in 0..values.len() {
        let (Some(f), Some(s)) = (fast_series[i], slow_series[i]) else {
            continue;
        };
        let line = f - s;
        seen += 1;
        let sig_val = if seen < signal {
            seed_sum += line;
            None
        } else if seen == signal {
            seed_sum += line;
            sig = seed_sum / signal as f64;
            Some(sig)
        } else {
            sig = line * k + sig * (1.0 - k);
            Some(sig)
        };
        out[i] = Some(MacdPoint {
            line,
            signal: sig_val,
            histogram: sig_val.map(|sv| line - sv),
        });
    }
    out
}
