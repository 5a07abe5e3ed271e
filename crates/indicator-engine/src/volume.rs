//! Volume-derived measures: OBV and VWAP (rolling and session-scoped).

use crate::Bar;

/// On-balance volume: signed cumulative volume keyed off close-to-close
/// direction. Defined from the first bar.
pub fn obv(bars: &[Bar]) -> Option<f64> {
    if bars.is_empty() {
        return None;
    }
    let mut cumulative = 0.0;
    for pair in bars.windows(2) {
        if pair[1].close > pair[0].close {
            cumulative += pair[1].volume;
        } else if pair[1].close < pair[0].close {
            cumulative -= pair[1].volume;
        }
    }
    Some(cumulative)
}

/// Rolling typical-price VWAP over the trailing `window` bars. `None` when
/// the window is short or carries no volume.
pub fn vwap(bars: &[Bar], window: usize) -> Option<f64> {
    if window == 0 || bars.len() < window {
        return None;
    }
    weighted_average(&bars[bars.len() - window..])
}

/// Session VWAP: typical-price VWAP cumulative from the first bar of the most
/// recent UTC session present in the sequence.
pub fn session_vwap(bars: &[Bar]) -> Option<f64> {
    let session = bars.last()?.timestamp.date_naive();
    let start = bars
        .iter()
        .rposition(|b| b.timestamp.date_naive() != session)
        .map_or(0, |i| i + 1);
    weighted_average(&bars[start..])
}

fn weighted_average(bars: &[Bar]) -> Option<f64> {
    let mut price_volume = 0.0;
    let mut volume = 0.0;
    for bar in bars {
        let typical = (bar.high + bar.low + bar.close) / 3.0;
        price_volume += typical * bar.volume;
        volume += bar.volume;
    }
    if volume == 0.0 {
        None
    } else {
        Some(price_volume / volume)
    }
}
