//! Append-only lifecycle event store.
//!
//! Idempotency lives in the table's unique index on `dedupe_key`:
//! `ON CONFLICT DO NOTHING` makes a retried emission a no-op without any
//! application-side bookkeeping.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use tradewind_core::{EngineError, EngineResult, LifecycleEvent, LifecycleEventSink};

/// PostgreSQL-backed lifecycle event sink.
pub struct PgLifecycleEventSink {
    pool: PgPool,
}

impl PgLifecycleEventSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LifecycleEventSink for PgLifecycleEventSink {
    #[instrument(skip(self, event), fields(event_type = %event.event_type, aggregate = %event.aggregate_id))]
    async fn record(&self, event: LifecycleEvent) -> EngineResult<()> {
        let result = sqlx::query(
            "INSERT INTO lifecycle_events \
                 (workspace_id, event_type, aggregate_id, dedupe_key, occurred_at, payload) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (dedupe_key) DO NOTHING",
        )
        .bind(event.workspace_id)
        .bind(&event.event_type)
        .bind(event.aggregate_id)
        .bind(&event.dedupe_key)
        .bind(event.occurred_at)
        .bind(&event.payload)
        .execute(&self.pool)
        .await
        .map_err(|e| EngineError::EventSink(e.to_string()))?;

        if result.rows_affected() == 0 {
            debug!(dedupe_key = %event.dedupe_key, "event already recorded; skipped");
        }
        Ok(())
    }
}
