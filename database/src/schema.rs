//! Embedded schema bootstrap.
//!
//! Idempotent DDL for the three tables this crate owns. Dedupe-key
//! uniqueness on the event and job tables is the durable enforcement point
//! for idempotent emission; application code never tracks keys in memory.

use sqlx::PgPool;
use tracing::{info, instrument};

use crate::error::DatabaseResult;

const SCHEMA_STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS positions (
        id UUID PRIMARY KEY,
        workspace_id UUID NOT NULL,
        symbol VARCHAR(32) NOT NULL,
        asset_class VARCHAR(16) NOT NULL,
        side VARCHAR(8) NOT NULL,
        trade_date DATE NOT NULL,
        entry_price NUMERIC(20, 8) NOT NULL,
        quantity NUMERIC(20, 8) NOT NULL,
        risk_amount NUMERIC(20, 8),
        stop_loss NUMERIC(20, 8),
        target NUMERIC(20, 8),
        is_open BOOLEAN NOT NULL DEFAULT TRUE,
        status VARCHAR(16) NOT NULL DEFAULT 'OPEN',
        exit_price NUMERIC(20, 8),
        exit_date DATE,
        pl NUMERIC(20, 8),
        pl_percent NUMERIC(20, 8),
        r_multiple NUMERIC(20, 8),
        outcome VARCHAR(16),
        exit_reason VARCHAR(8),
        notes TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_positions_open ON positions (is_open, trade_date)",
    r#"
    CREATE TABLE IF NOT EXISTS lifecycle_events (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        workspace_id UUID NOT NULL,
        event_type VARCHAR(64) NOT NULL,
        aggregate_id UUID NOT NULL,
        dedupe_key VARCHAR(64) NOT NULL UNIQUE,
        occurred_at TIMESTAMPTZ NOT NULL,
        payload JSONB NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_events_aggregate ON lifecycle_events (aggregate_id)",
    r#"
    CREATE TABLE IF NOT EXISTS recompute_jobs (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        workspace_id UUID NOT NULL,
        job_type VARCHAR(64) NOT NULL,
        payload JSONB NOT NULL,
        dedupe_key VARCHAR(64) NOT NULL UNIQUE,
        priority INT NOT NULL DEFAULT 5,
        max_attempts INT NOT NULL DEFAULT 3,
        attempts INT NOT NULL DEFAULT 0,
        status VARCHAR(16) NOT NULL DEFAULT 'queued',
        enqueued_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_jobs_status ON recompute_jobs (status, priority)",
];

/// Apply the embedded schema. Safe to run repeatedly.
#[instrument(skip(pool))]
pub async fn ensure_schema(pool: &PgPool) -> DatabaseResult<()> {
    for statement in SCHEMA_STATEMENTS {
        sqlx::query(statement).execute(pool).await?;
    }
    info!("schema ensured ({} statements)", SCHEMA_STATEMENTS.len());
    Ok(())
}
