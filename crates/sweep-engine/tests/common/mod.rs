//! In-memory port implementations for sweep tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use quote_gateway::{Instrument, QuoteError, QuoteResult, QuoteSource};
use rust_decimal::Decimal;
use tokio::sync::Mutex;
use uuid::Uuid;

use tradewind_core::{
    AssetClass, CloseOutcome, CloseRequest, EngineError, EngineResult, LifecycleEvent,
    LifecycleEventSink, Position, PositionId, PositionStatus, PositionStore, RecomputeJob,
    RecomputeJobQueue, Side,
};

pub fn open_position(
    symbol: &str,
    side: Side,
    trade_date: NaiveDate,
    entry: Decimal,
    quantity: Decimal,
    stop: Option<Decimal>,
    target: Option<Decimal>,
    risk: Option<Decimal>,
) -> Position {
    Position {
        id: Uuid::new_v4(),
        workspace_id: Uuid::new_v4(),
        symbol: symbol.to_string(),
        asset_class: AssetClass::Equity,
        side,
        trade_date,
        entry_price: entry,
        quantity,
        risk_amount: risk,
        stop_loss: stop,
        target,
        is_open: true,
        status: PositionStatus::Open,
        exit_price: None,
        exit_date: None,
        pl: None,
        pl_percent: None,
        r_multiple: None,
        outcome: None,
        exit_reason: None,
        notes: Some("entered on breakout".to_string()),
    }
}

/// Positions behind a single async mutex; the lock plays the role of the
/// database row lock, serializing close attempts.
#[derive(Default)]
pub struct InMemoryPositionStore {
    positions: Mutex<HashMap<PositionId, Position>>,
    fail_close_for: Mutex<HashSet<PositionId>>,
}

impl InMemoryPositionStore {
    pub async fn insert(&self, position: Position) {
        self.positions.lock().await.insert(position.id, position);
    }

    pub async fn fail_close_for(&self, id: PositionId) {
        self.fail_close_for.lock().await.insert(id);
    }

    pub async fn get(&self, id: PositionId) -> Option<Position> {
        self.positions.lock().await.get(&id).cloned()
    }
}

#[async_trait]
impl PositionStore for InMemoryPositionStore {
    async fn list_open(&self, limit: u32) -> EngineResult<Vec<Position>> {
        let guard = self.positions.lock().await;
        let mut open: Vec<Position> = guard.values().filter(|p| p.is_open).cloned().collect();
        open.sort_by_key(|p| p.trade_date);
        open.truncate(limit as usize);
        Ok(open)
    }

    async fn close(&self, id: PositionId, request: CloseRequest) -> EngineResult<CloseOutcome> {
        let mut guard = self.positions.lock().await;
        if self.fail_close_for.lock().await.contains(&id) {
            return Err(EngineError::store("simulated close-write failure"));
        }
        let position = guard
            .get_mut(&id)
            .ok_or(EngineError::PositionNotFound(id))?;
        if !position.is_open {
            return Ok(CloseOutcome::AlreadyClosed(position.clone()));
        }
        let metrics = position.close_metrics(request.exit_price);
        position.exit_price = Some(request.exit_price);
        position.exit_date = Some(request.exit_date);
        position.pl = Some(metrics.pl);
        position.pl_percent = Some(metrics.pl_percent);
        position.r_multiple = metrics.r_multiple;
        position.outcome = Some(metrics.outcome);
        position.exit_reason = Some(request.exit_reason);
        position.is_open = false;
        position.status = PositionStatus::Closed;
        let audit = request.audit_note();
        position.notes = Some(match position.notes.take() {
            Some(existing) => format!("{existing}\n{audit}"),
            None => audit,
        });
        Ok(CloseOutcome::Closed(position.clone()))
    }
}

/// Event store keyed by dedupe key; duplicate records collapse.
#[derive(Default)]
pub struct InMemoryEventSink {
    events: Mutex<HashMap<String, LifecycleEvent>>,
    fail: AtomicBool,
}

impl InMemoryEventSink {
    pub fn set_failing(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    pub async fn stored(&self) -> Vec<LifecycleEvent> {
        self.events.lock().await.values().cloned().collect()
    }
}

#[async_trait]
impl LifecycleEventSink for InMemoryEventSink {
    async fn record(&self, event: LifecycleEvent) -> EngineResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(EngineError::EventSink("sink offline".to_string()));
        }
        self.events
            .lock()
            .await
            .entry(event.dedupe_key.clone())
            .or_insert(event);
        Ok(())
    }
}

/// Job queue keyed by dedupe key; re-enqueueing is a no-op.
#[derive(Default)]
pub struct InMemoryJobQueue {
    jobs: Mutex<HashMap<String, RecomputeJob>>,
    fail: AtomicBool,
}

impl InMemoryJobQueue {
    pub fn set_failing(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    pub async fn stored(&self) -> Vec<RecomputeJob> {
        self.jobs.lock().await.values().cloned().collect()
    }
}

#[async_trait]
impl RecomputeJobQueue for InMemoryJobQueue {
    async fn enqueue(&self, job: RecomputeJob) -> EngineResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(EngineError::JobQueue("queue offline".to_string()));
        }
        self.jobs
            .lock()
            .await
            .entry(job.dedupe_key.clone())
            .or_insert(job);
        Ok(())
    }
}

/// Fixed price table keyed by normalized lookup symbol.
#[derive(Default)]
pub struct StaticQuotes {
    prices: HashMap<String, Decimal>,
}

impl StaticQuotes {
    pub fn with_price(mut self, symbol: &str, price: Decimal) -> Self {
        self.prices.insert(symbol.to_string(), price);
        self
    }
}

#[async_trait]
impl QuoteSource for StaticQuotes {
    async fn current_price(&self, instrument: &Instrument) -> QuoteResult<Decimal> {
        self.prices
            .get(&instrument.symbol)
            .copied()
            .ok_or_else(|| QuoteError::Unavailable(instrument.symbol.clone()))
    }
}

/// A vendor that never answers; exercises the cycle-level timeout.
pub struct HangingQuotes;

#[async_trait]
impl QuoteSource for HangingQuotes {
    async fn current_price(&self, _instrument: &Instrument) -> QuoteResult<Decimal> {
        tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
        unreachable!("sweep timeout should have fired")
    }
}
