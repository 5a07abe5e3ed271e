//! Close-condition evaluation for a single open position.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tradewind_core::{ExitReason, Position, Side};

/// Calendar days a position may stay open before the time-based exit fires.
pub const DEFAULT_MAX_HOLD_DAYS: i64 = 5;

/// Decide whether `position` must be closed at `price`.
///
/// Precedence is strict: stop-loss, then target, then time expiry. On a
/// gapped print that satisfies both stop and target, the stop wins. Time
/// expiry fires only when neither price condition did, regardless of price.
pub fn close_reason(
    position: &Position,
    price: Decimal,
    today: NaiveDate,
    max_hold_days: i64,
) -> Option<ExitReason> {
    if let Some(stop) = position.stop_loss {
        let hit = match position.side {
            Side::Long => price <= stop,
            Side::Short => price >= stop,
        };
        if hit {
            return Some(ExitReason::StopLoss);
        }
    }

    if let Some(target) = position.target {
        let hit = match position.side {
            Side::Long => price >= target,
            Side::Short => price <= target,
        };
        if hit {
            return Some(ExitReason::Target);
        }
    }

    if position.held_days(today) >= max_hold_days {
        return Some(ExitReason::TimeExpiry);
    }

    None
}
