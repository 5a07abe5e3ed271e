use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Core journal types and data structures for the Tradewind engine.
///
/// This module defines the fundamental types used throughout the position
/// lifecycle: open positions, close results, lifecycle events, and the
/// recompute-job message handed to downstream consumers.

// Re-export instrument types for integration
pub use quote_gateway::{AssetClass, Instrument};

/// Unique identifiers for journal entities
pub type PositionId = Uuid;
pub type WorkspaceId = Uuid;

/// Event type emitted when a position reaches its terminal close transition.
pub const EVENT_TRADE_CLOSED: &str = "TRADE_CLOSED";

/// Job type for the downstream analytics/coaching recompute.
pub const JOB_ANALYTICS_RECOMPUTE: &str = "analytics.recompute";

/// Direction of a journaled trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Long,
    Short,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Long => "LONG",
            Side::Short => "SHORT",
        }
    }
}

/// Lifecycle status of a journal entry. A position is created `Open` and
/// takes exactly one terminal transition to `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PositionStatus {
    Open,
    Closed,
}

impl PositionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PositionStatus::Open => "OPEN",
            PositionStatus::Closed => "CLOSED",
        }
    }
}

/// Why a position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitReason {
    #[serde(rename = "sl")]
    StopLoss,
    #[serde(rename = "tp")]
    Target,
    #[serde(rename = "time")]
    TimeExpiry,
}

impl ExitReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExitReason::StopLoss => "sl",
            ExitReason::Target => "tp",
            ExitReason::TimeExpiry => "time",
        }
    }
}

/// Realized outcome classification, from the sign of the realized P&L.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Loss,
    Breakeven,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Win => "win",
            Outcome::Loss => "loss",
            Outcome::Breakeven => "breakeven",
        }
    }
}

/// Who initiated a close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CloseSource {
    Sweep,
    Manual,
}

impl CloseSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            CloseSource::Sweep => "sweep",
            CloseSource::Manual => "manual",
        }
    }
}

/// An open or closed journal entry. Owned exclusively by the workspace that
/// created it; mutated only by the owning user or the lifecycle sweep, and
/// immutable once closed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub id: PositionId,
    pub workspace_id: WorkspaceId,
    pub symbol: String,
    pub asset_class: AssetClass,
    pub side: Side,
    pub trade_date: NaiveDate,
    pub entry_price: Decimal,
    pub quantity: Decimal,
    pub risk_amount: Option<Decimal>,
    pub stop_loss: Option<Decimal>,
    pub target: Option<Decimal>,
    pub is_open: bool,
    pub status: PositionStatus,
    pub exit_price: Option<Decimal>,
    pub exit_date: Option<NaiveDate>,
    pub pl: Option<Decimal>,
    pub pl_percent: Option<Decimal>,
    pub r_multiple: Option<Decimal>,
    pub outcome: Option<Outcome>,
    pub exit_reason: Option<ExitReason>,
    pub notes: Option<String>,
}

impl Position {
    /// Calendar days this position has been open as of `today`.
    pub fn held_days(&self, today: NaiveDate) -> i64 {
        (today - self.trade_date).num_days()
    }

    /// Normalized vendor lookup key for this position's instrument.
    pub fn instrument(&self) -> Instrument {
        Instrument::normalize(&self.symbol, self.asset_class)
    }

    /// Realized performance at a given exit price. Sign convention follows
    /// the side: a LONG profits when exit exceeds entry, a SHORT when exit
    /// is below entry.
    pub fn close_metrics(&self, exit_price: Decimal) -> CloseMetrics {
        let pl = match self.side {
            Side::Long => (exit_price - self.entry_price) * self.quantity,
            Side::Short => (self.entry_price - exit_price) * self.quantity,
        };
        let pl_percent = if self.entry_price.is_zero() {
            Decimal::ZERO
        } else {
            let moved = match self.side {
                Side::Long => exit_price - self.entry_price,
                Side::Short => self.entry_price - exit_price,
            };
            moved / self.entry_price * Decimal::ONE_HUNDRED
        };
        let r_multiple = self
            .risk_amount
            .filter(|risk| risk > &Decimal::ZERO)
            .map(|risk| pl / risk);
        let outcome = if pl > Decimal::ZERO {
            Outcome::Win
        } else if pl < Decimal::ZERO {
            Outcome::Loss
        } else {
            Outcome::Breakeven
        };
        CloseMetrics {
            pl,
            pl_percent,
            r_multiple,
            outcome,
        }
    }
}

/// Realized performance computed at close time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CloseMetrics {
    pub pl: Decimal,
    pub pl_percent: Decimal,
    /// `None` when no positive risk amount was recorded at entry.
    pub r_multiple: Option<Decimal>,
    pub outcome: Outcome,
}

/// Instruction for the store's atomic close transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloseRequest {
    pub exit_price: Decimal,
    pub exit_date: NaiveDate,
    pub exit_reason: ExitReason,
    pub source: CloseSource,
}

impl CloseRequest {
    /// Audit line appended to the position's notes on an automated close.
    pub fn audit_note(&self) -> String {
        format!(
            "[auto-close] reason={} source={} exit={} date={}",
            self.exit_reason.as_str(),
            self.source.as_str(),
            self.exit_price,
            self.exit_date
        )
    }
}

/// Result of an atomic close attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum CloseOutcome {
    /// This caller performed the terminal transition.
    Closed(Position),
    /// Another writer got there first; carries the row as that writer left it.
    AlreadyClosed(Position),
}

/// An immutable, append-only domain fact. The sink deduplicates on
/// `dedupe_key`, so retried emission is safe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifecycleEvent {
    pub workspace_id: WorkspaceId,
    pub event_type: String,
    pub aggregate_id: Uuid,
    pub dedupe_key: String,
    pub occurred_at: DateTime<Utc>,
    pub payload: serde_json::Value,
}

/// Fire-and-forget message asking a downstream consumer to recompute derived
/// analytics. The queue deduplicates on `dedupe_key`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecomputeJob {
    pub workspace_id: WorkspaceId,
    pub job_type: String,
    pub payload: serde_json::Value,
    pub dedupe_key: String,
    pub priority: i32,
    pub max_attempts: i32,
}
