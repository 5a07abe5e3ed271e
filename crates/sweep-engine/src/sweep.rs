//! The periodic sweep across open positions.
//!
//! Positions are evaluated concurrently on a bounded worker pool; quote
//! fetches dominate latency and are independent per symbol. The only
//! mutual-exclusion boundary is the store's per-row close transaction, so a
//! slow or failed quote for one symbol never blocks the others.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use quote_gateway::QuoteSource;
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::{debug, error, info, instrument, warn};

use tradewind_core::{
    CloseOutcome, CloseRequest, CloseSource, EngineResult, ExitReason, LifecycleEvent,
    LifecycleEventSink, Position, PositionId, PositionStore, RecomputeJob, RecomputeJobQueue,
    WorkspaceId, EVENT_TRADE_CLOSED, JOB_ANALYTICS_RECOMPUTE,
};

use crate::dedupe::{close_event_key, recompute_job_key};
use crate::evaluator::{close_reason, DEFAULT_MAX_HOLD_DAYS};

pub const MIN_SWEEP_LIMIT: u32 = 1;
pub const MAX_SWEEP_LIMIT: u32 = 500;

/// Sweep invocation parameters. The external scheduler supplies `limit` and
/// `dry_run`; the rest are operator tuning knobs.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Max positions per sweep, clamped to 1..=500 at run time.
    pub limit: u32,
    /// Evaluate without mutating state; used for preview/audit.
    pub dry_run: bool,
    /// Calendar days before the time-based exit fires.
    pub max_hold_days: i64,
    /// Per-position quote budget; expiry counts as "unavailable this cycle".
    pub quote_timeout: Duration,
    /// Worker-pool width.
    pub concurrency: usize,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            limit: 200,
            dry_run: false,
            max_hold_days: DEFAULT_MAX_HOLD_DAYS,
            quote_timeout: Duration::from_secs(5),
            concurrency: 8,
        }
    }
}

/// One triggered close, recorded for audit whether or not it was executed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseDecision {
    pub position_id: PositionId,
    pub workspace_id: WorkspaceId,
    pub symbol: String,
    pub price: Decimal,
    pub reason: ExitReason,
}

/// A per-position failure that did not stop the sweep.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepFailure {
    pub position_id: PositionId,
    pub symbol: String,
    pub message: String,
}

/// Aggregate result of one sweep run.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepReport {
    pub dry_run: bool,
    pub checked: usize,
    pub eligible: usize,
    pub closed: usize,
    pub already_closed: usize,
    pub price_unavailable: usize,
    pub decisions: Vec<CloseDecision>,
    pub failures: Vec<SweepFailure>,
}

impl SweepReport {
    fn absorb(&mut self, outcome: PositionOutcome) {
        match outcome {
            PositionOutcome::NoAction => {}
            PositionOutcome::PriceUnavailable => self.price_unavailable += 1,
            PositionOutcome::WouldClose(decision) => {
                self.eligible += 1;
                self.decisions.push(decision);
            }
            PositionOutcome::Closed(decision) => {
                self.eligible += 1;
                self.closed += 1;
                self.decisions.push(decision);
            }
            PositionOutcome::AlreadyClosed => {
                self.eligible += 1;
                self.already_closed += 1;
            }
            PositionOutcome::Failed(failure) => {
                self.eligible += 1;
                self.failures.push(failure);
            }
        }
    }
}

enum PositionOutcome {
    NoAction,
    PriceUnavailable,
    WouldClose(CloseDecision),
    Closed(CloseDecision),
    AlreadyClosed,
    Failed(SweepFailure),
}

/// Periodic evaluator over all open positions.
pub struct SweepEngine {
    store: Arc<dyn PositionStore>,
    quotes: Arc<dyn QuoteSource>,
    events: Arc<dyn LifecycleEventSink>,
    jobs: Arc<dyn RecomputeJobQueue>,
    config: SweepConfig,
}

impl SweepEngine {
    pub fn new(
        store: Arc<dyn PositionStore>,
        quotes: Arc<dyn QuoteSource>,
        events: Arc<dyn LifecycleEventSink>,
        jobs: Arc<dyn RecomputeJobQueue>,
        config: SweepConfig,
    ) -> Self {
        Self {
            store,
            quotes,
            events,
            jobs,
            config,
        }
    }

    /// Run one sweep. Per-position failures are aggregated into the report;
    /// only a failure to load the batch itself is fatal.
    #[instrument(skip(self), fields(limit = self.config.limit, dry_run = self.config.dry_run))]
    pub async fn run(&self) -> EngineResult<SweepReport> {
        let limit = self.config.limit.clamp(MIN_SWEEP_LIMIT, MAX_SWEEP_LIMIT);
        let positions = self.store.list_open(limit).await?;
        let today = Utc::now().date_naive();

        info!(count = positions.len(), "sweeping open positions");

        let mut report = SweepReport {
            dry_run: self.config.dry_run,
            checked: positions.len(),
            ..Default::default()
        };

        let semaphore = Arc::new(Semaphore::new(self.config.concurrency.max(1)));
        let mut workers = JoinSet::new();
        for position in positions {
            let semaphore = semaphore.clone();
            let store = self.store.clone();
            let quotes = self.quotes.clone();
            let events = self.events.clone();
            let jobs = self.jobs.clone();
            let config = self.config.clone();
            workers.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        return PositionOutcome::Failed(SweepFailure {
                            position_id: position.id,
                            symbol: position.symbol.clone(),
                            message: "worker pool shut down".to_string(),
                        })
                    }
                };
                evaluate_position(store, quotes, events, jobs, position, today, &config).await
            });
        }

        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(outcome) => report.absorb(outcome),
                Err(err) => error!(error = %err, "sweep worker aborted"),
            }
        }

        info!(
            checked = report.checked,
            eligible = report.eligible,
            closed = report.closed,
            already_closed = report.already_closed,
            price_unavailable = report.price_unavailable,
            failures = report.failures.len(),
            dry_run = report.dry_run,
            "sweep complete"
        );
        Ok(report)
    }
}

async fn evaluate_position(
    store: Arc<dyn PositionStore>,
    quotes: Arc<dyn QuoteSource>,
    events: Arc<dyn LifecycleEventSink>,
    jobs: Arc<dyn RecomputeJobQueue>,
    position: Position,
    today: NaiveDate,
    config: &SweepConfig,
) -> PositionOutcome {
    let instrument = position.instrument();
    let price = match timeout(config.quote_timeout, quotes.current_price(&instrument)).await {
        Ok(Ok(price)) => price,
        Ok(Err(err)) => {
            debug!(position = %position.id, instrument = %instrument, error = %err,
                "quote unavailable, skipping until next cycle");
            return PositionOutcome::PriceUnavailable;
        }
        Err(_) => {
            debug!(position = %position.id, instrument = %instrument,
                "quote timed out, skipping until next cycle");
            return PositionOutcome::PriceUnavailable;
        }
    };

    let Some(reason) = close_reason(&position, price, today, config.max_hold_days) else {
        return PositionOutcome::NoAction;
    };

    let decision = CloseDecision {
        position_id: position.id,
        workspace_id: position.workspace_id,
        symbol: position.symbol.clone(),
        price,
        reason,
    };

    if config.dry_run {
        return PositionOutcome::WouldClose(decision);
    }

    let request = CloseRequest {
        exit_price: price,
        exit_date: today,
        exit_reason: reason,
        source: CloseSource::Sweep,
    };
    match store.close(position.id, request).await {
        Ok(CloseOutcome::Closed(closed)) => {
            info!(position = %closed.id, symbol = %closed.symbol, reason = reason.as_str(),
                "position closed");
            publish_close(events.as_ref(), jobs.as_ref(), &closed, reason, today).await;
            PositionOutcome::Closed(decision)
        }
        Ok(CloseOutcome::AlreadyClosed(_)) => {
            debug!(position = %position.id, "already closed by a concurrent writer");
            PositionOutcome::AlreadyClosed
        }
        Err(err) => {
            warn!(position = %position.id, error = %err, "close failed; continuing sweep");
            PositionOutcome::Failed(SweepFailure {
                position_id: position.id,
                symbol: position.symbol,
                message: err.to_string(),
            })
        }
    }
}

/// Post-close emission, outside the close transaction. Failures here are
/// logged and swallowed: the authoritative state change already committed,
/// and both sinks deduplicate on the key if a later retry re-emits.
async fn publish_close(
    events: &dyn LifecycleEventSink,
    jobs: &dyn RecomputeJobQueue,
    position: &Position,
    reason: ExitReason,
    close_date: NaiveDate,
) {
    let event = LifecycleEvent {
        workspace_id: position.workspace_id,
        event_type: EVENT_TRADE_CLOSED.to_string(),
        aggregate_id: position.id,
        dedupe_key: close_event_key(
            position.workspace_id,
            position.id,
            reason,
            CloseSource::Sweep,
            close_date,
        ),
        occurred_at: Utc::now(),
        payload: serde_json::json!({
            "symbol": position.symbol,
            "side": position.side.as_str(),
            "exitReason": reason.as_str(),
            "exitPrice": position.exit_price,
            "pl": position.pl,
            "plPercent": position.pl_percent,
            "rMultiple": position.r_multiple,
            "outcome": position.outcome.map(|o| o.as_str()),
        }),
    };
    if let Err(err) = events.record(event).await {
        warn!(position = %position.id, error = %err,
            "lifecycle event emission failed after committed close");
    }

    let job = RecomputeJob {
        workspace_id: position.workspace_id,
        job_type: JOB_ANALYTICS_RECOMPUTE.to_string(),
        payload: serde_json::json!({
            "positionId": position.id,
            "symbol": position.symbol,
        }),
        dedupe_key: recompute_job_key(
            position.workspace_id,
            position.id,
            reason,
            CloseSource::Sweep,
            close_date,
            JOB_ANALYTICS_RECOMPUTE,
        ),
        priority: 5,
        max_attempts: 3,
    };
    if let Err(err) = jobs.enqueue(job).await {
        warn!(position = %position.id, error = %err,
            "recompute enqueue failed after committed close");
    }
}
