//! Warm-up accounting: which indicator families have enough history to be
//! numerically meaningful.

use serde::{Deserialize, Serialize};

pub const RSI_MIN_BARS: usize = 15;
pub const MACD_MIN_BARS: usize = 35;
pub const ATR_MIN_BARS: usize = 15;
pub const ADX_MIN_BARS: usize = 29;
pub const BOLLINGER_MIN_BARS: usize = 20;
pub const SQUEEZE_MIN_BARS: usize = 34;
pub const LONG_MA_MIN_BARS: usize = 200;

/// Per-family readiness for a bar count. Downstream consumers check
/// `core_ready` (or the per-family flag) before trusting a value used for
/// decisioning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarmupStatus {
    pub bar_count: usize,
    pub rsi_ready: bool,
    pub macd_ready: bool,
    pub atr_ready: bool,
    pub adx_ready: bool,
    pub bollinger_ready: bool,
    pub squeeze_ready: bool,
    pub long_ma_ready: bool,
    /// Every family except the 200-bar averages, which gate long-horizon
    /// context rather than the core decision set.
    pub core_ready: bool,
    pub missing: Vec<String>,
}

impl WarmupStatus {
    pub fn for_bar_count(bar_count: usize) -> Self {
        let rsi_ready = bar_count >= RSI_MIN_BARS;
        let macd_ready = bar_count >= MACD_MIN_BARS;
        let atr_ready = bar_count >= ATR_MIN_BARS;
        let adx_ready = bar_count >= ADX_MIN_BARS;
        let bollinger_ready = bar_count >= BOLLINGER_MIN_BARS;
        let squeeze_ready = bar_count >= SQUEEZE_MIN_BARS;
        let long_ma_ready = bar_count >= LONG_MA_MIN_BARS;

        let mut missing = Vec::new();
        for (ready, name) in [
            (rsi_ready, "rsi"),
            (macd_ready, "macd"),
            (atr_ready, "atr"),
            (adx_ready, "adx"),
            (bollinger_ready, "bollinger"),
            (squeeze_ready, "squeeze"),
            (long_ma_ready, "longMovingAverages"),
        ] {
            if !ready {
                missing.push(name.to_string());
            }
        }

        Self {
            bar_count,
            rsi_ready,
            macd_ready,
            atr_ready,
            adx_ready,
            bollinger_ready,
            squeeze_ready,
            long_ma_ready,
            core_ready: rsi_ready
                && macd_ready
                && atr_ready
                && adx_ready
                && bollinger_ready
                && squeeze_ready,
            missing,
        }
    }
}
