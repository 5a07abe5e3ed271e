//! Downstream recompute-job queue.
//!
//! Enqueueing is modeled as a durable message with an idempotency key rather
//! than a direct call, keeping the engine's and the consumer's failure
//! domains decoupled. Re-enqueueing under the same key is a no-op.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use tradewind_core::{EngineError, EngineResult, RecomputeJob, RecomputeJobQueue};

/// PostgreSQL-backed recompute-job queue.
pub struct PgRecomputeJobQueue {
    pool: PgPool,
}

impl PgRecomputeJobQueue {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecomputeJobQueue for PgRecomputeJobQueue {
    #[instrument(skip(self, job), fields(job_type = %job.job_type, workspace = %job.workspace_id))]
    async fn enqueue(&self, job: RecomputeJob) -> EngineResult<()> {
        let result = sqlx::query(
            "INSERT INTO recompute_jobs \
                 (workspace_id, job_type, payload, dedupe_key, priority, max_attempts) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (dedupe_key) DO NOTHING",
        )
        .bind(job.workspace_id)
        .bind(&job.job_type)
        .bind(&job.payload)
        .bind(&job.dedupe_key)
        .bind(job.priority)
        .bind(job.max_attempts)
        .execute(&self.pool)
        .await
        .map_err(|e| EngineError::JobQueue(e.to_string()))?;

        if result.rows_affected() == 0 {
            debug!(dedupe_key = %job.dedupe_key, "job already queued; skipped");
        }
        Ok(())
    }
}
