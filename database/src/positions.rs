//! Position store backed by PostgreSQL.
//!
//! The close path is the one mutual-exclusion boundary in the system: a
//! single transaction takes a `FOR UPDATE` row lock, re-checks that the
//! position is still open, computes realized metrics from the locked row,
//! and updates it. Any failure after the lock is held aborts the whole
//! transaction; a half-updated position must never be left behind.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, instrument};
use uuid::Uuid;

use tradewind_core::{
    AssetClass, CloseOutcome, CloseRequest, EngineError, EngineResult, ExitReason, Outcome,
    Position, PositionId, PositionStatus, PositionStore, Side,
};

const SELECT_COLUMNS: &str = "id, workspace_id, symbol, asset_class, side, trade_date, \
     entry_price, quantity, risk_amount, stop_loss, target, is_open, status, \
     exit_price, exit_date, pl, pl_percent, r_multiple, outcome, exit_reason, notes";

/// Raw row shape from the positions table. Converted into the typed domain
/// struct at this boundary; untyped records never cross into the engine.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PositionRow {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub symbol: String,
    pub asset_class: String,
    pub side: String,
    pub trade_date: NaiveDate,
    pub entry_price: Decimal,
    pub quantity: Decimal,
    pub risk_amount: Option<Decimal>,
    pub stop_loss: Option<Decimal>,
    pub target: Option<Decimal>,
    pub is_open: bool,
    pub status: String,
    pub exit_price: Option<Decimal>,
    pub exit_date: Option<NaiveDate>,
    pub pl: Option<Decimal>,
    pub pl_percent: Option<Decimal>,
    pub r_multiple: Option<Decimal>,
    pub outcome: Option<String>,
    pub exit_reason: Option<String>,
    pub notes: Option<String>,
}

fn parse_side(raw: &str) -> EngineResult<Side> {
    match raw {
        "LONG" => Ok(Side::Long),
        "SHORT" => Ok(Side::Short),
        other => Err(EngineError::invalid_field("side", other)),
    }
}

fn parse_status(raw: &str) -> EngineResult<PositionStatus> {
    match raw {
        "OPEN" => Ok(PositionStatus::Open),
        "CLOSED" => Ok(PositionStatus::Closed),
        other => Err(EngineError::invalid_field("status", other)),
    }
}

fn parse_outcome(raw: &str) -> EngineResult<Outcome> {
    match raw {
        "win" => Ok(Outcome::Win),
        "loss" => Ok(Outcome::Loss),
        "breakeven" => Ok(Outcome::Breakeven),
        other => Err(EngineError::invalid_field("outcome", other)),
    }
}

fn parse_exit_reason(raw: &str) -> EngineResult<ExitReason> {
    match raw {
        "sl" => Ok(ExitReason::StopLoss),
        "tp" => Ok(ExitReason::Target),
        "time" => Ok(ExitReason::TimeExpiry),
        other => Err(EngineError::invalid_field("exit_reason", other)),
    }
}

impl TryFrom<PositionRow> for Position {
    type Error = EngineError;

    fn try_from(row: PositionRow) -> EngineResult<Self> {
        let asset_class: AssetClass = row
            .asset_class
            .parse()
            .map_err(|_| EngineError::invalid_field("asset_class", &row.asset_class))?;
        Ok(Position {
            id: row.id,
            workspace_id: row.workspace_id,
            symbol: row.symbol,
            asset_class,
            side: parse_side(&row.side)?,
            trade_date: row.trade_date,
            entry_price: row.entry_price,
            quantity: row.quantity,
            risk_amount: row.risk_amount,
            stop_loss: row.stop_loss,
            target: row.target,
            is_open: row.is_open,
            status: parse_status(&row.status)?,
            exit_price: row.exit_price,
            exit_date: row.exit_date,
            pl: row.pl,
            pl_percent: row.pl_percent,
            r_multiple: row.r_multiple,
            outcome: row.outcome.as_deref().map(parse_outcome).transpose()?,
            exit_reason: row
                .exit_reason
                .as_deref()
                .map(parse_exit_reason)
                .transpose()?,
            notes: row.notes,
        })
    }
}

/// PostgreSQL-backed implementation of the position store port.
pub struct PgPositionStore {
    pool: PgPool,
}

impl PgPositionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PositionStore for PgPositionStore {
    #[instrument(skip(self))]
    async fn list_open(&self, limit: u32) -> EngineResult<Vec<Position>> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM positions \
             WHERE is_open = TRUE ORDER BY trade_date ASC, id ASC LIMIT $1"
        );
        let rows: Vec<PositionRow> = sqlx::query_as(&sql)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(EngineError::store)?;
        debug!(count = rows.len(), "loaded open positions");
        rows.into_iter().map(Position::try_from).collect()
    }

    #[instrument(skip(self, request), fields(position = %id, reason = request.exit_reason.as_str()))]
    async fn close(&self, id: PositionId, request: CloseRequest) -> EngineResult<CloseOutcome> {
        let mut tx = self.pool.begin().await.map_err(EngineError::store)?;

        // Row lock: serializes this close against concurrent sweep workers
        // and manual closes of the same position.
        let lock_sql = format!("SELECT {SELECT_COLUMNS} FROM positions WHERE id = $1 FOR UPDATE");
        let row: Option<PositionRow> = sqlx::query_as(&lock_sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(EngineError::store)?;
        let Some(row) = row else {
            return Err(EngineError::PositionNotFound(id));
        };
        let position = Position::try_from(row)?;

        if !position.is_open {
            // Race loser: report the row as the winning writer left it.
            tx.rollback().await.map_err(EngineError::store)?;
            return Ok(CloseOutcome::AlreadyClosed(position));
        }

        let metrics = position.close_metrics(request.exit_price);
        let audit = request.audit_note();

        let update_sql = format!(
            "UPDATE positions SET \
                 exit_price = $2, exit_date = $3, pl = $4, pl_percent = $5, \
                 r_multiple = $6, outcome = $7, exit_reason = $8, \
                 is_open = FALSE, status = 'CLOSED', \
                 notes = CASE WHEN notes IS NULL OR notes = '' THEN $9 \
                              ELSE notes || E'\\n' || $9 END, \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {SELECT_COLUMNS}"
        );
        // An error here drops `tx` uncommitted, rolling back the lock and
        // any partial state.
        let updated: PositionRow = sqlx::query_as(&update_sql)
            .bind(id)
            .bind(request.exit_price)
            .bind(request.exit_date)
            .bind(metrics.pl)
            .bind(metrics.pl_percent)
            .bind(metrics.r_multiple)
            .bind(metrics.outcome.as_str())
            .bind(request.exit_reason.as_str())
            .bind(&audit)
            .fetch_one(&mut *tx)
            .await
            .map_err(EngineError::store)?;
        let closed = Position::try_from(updated)?;

        tx.commit().await.map_err(EngineError::store)?;
        Ok(CloseOutcome::Closed(closed))
    }
}
