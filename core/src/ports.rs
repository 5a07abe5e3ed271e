//! Storage and sink ports the lifecycle engine operates through.
//!
//! The engine never talks to a database or queue directly; it goes through
//! these traits so the authoritative close transaction, the event sink, and
//! the job queue stay in independent failure domains.

use async_trait::async_trait;

use crate::error::EngineResult;
use crate::types::{
    CloseOutcome, CloseRequest, LifecycleEvent, Position, PositionId, RecomputeJob,
};

/// Authoritative persistence for journal positions.
#[async_trait]
pub trait PositionStore: Send + Sync {
    /// Open positions, oldest trade date first, capped at `limit`.
    async fn list_open(&self, limit: u32) -> EngineResult<Vec<Position>>;

    /// Atomically close a position exactly once. Implementations must take a
    /// write lock on the row, re-check that it is still open, and report
    /// `CloseOutcome::AlreadyClosed` instead of mutating a closed row. A
    /// failure after the lock is held must abort the whole transaction.
    async fn close(&self, id: PositionId, request: CloseRequest) -> EngineResult<CloseOutcome>;
}

/// Append-only sink for lifecycle events. Deduplicates on the event's
/// `dedupe_key`; recording the same event twice stores it once.
#[async_trait]
pub trait LifecycleEventSink: Send + Sync {
    async fn record(&self, event: LifecycleEvent) -> EngineResult<()>;
}

/// Fire-and-forget queue for downstream recompute work. Deduplicates on the
/// job's `dedupe_key`; re-enqueueing after a retry is a no-op.
#[async_trait]
pub trait RecomputeJobQueue: Send + Sync {
    async fn enqueue(&self, job: RecomputeJob) -> EngineResult<()>;
}
