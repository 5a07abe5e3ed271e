//! Deterministic dedupe keys for lifecycle events and recompute jobs.
//!
//! Two sweep executions that close the same position on the same day under
//! the same reason must produce the same key, so a retried emission collapses
//! to a single stored record. Uniqueness is enforced by the durable store's
//! unique index, never by in-process state.

use chrono::NaiveDate;
use sha2::{Digest, Sha256};
use tradewind_core::{CloseSource, ExitReason, PositionId, WorkspaceId};

/// Key for the `TRADE_CLOSED` lifecycle event.
pub fn close_event_key(
    workspace_id: WorkspaceId,
    position_id: PositionId,
    reason: ExitReason,
    source: CloseSource,
    close_date: NaiveDate,
) -> String {
    digest(&format!(
        "evt:trade-closed:{workspace_id}:{position_id}:{}:{}:{close_date}",
        reason.as_str(),
        source.as_str()
    ))
}

/// Key for the downstream recompute job triggered by a close.
pub fn recompute_job_key(
    workspace_id: WorkspaceId,
    position_id: PositionId,
    reason: ExitReason,
    source: CloseSource,
    close_date: NaiveDate,
    job_type: &str,
) -> String {
    digest(&format!(
        "job:{job_type}:{workspace_id}:{position_id}:{}:{}:{close_date}",
        reason.as_str(),
        source.as_str()
    ))
}

fn digest(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tradewind_core::JOB_ANALYTICS_RECOMPUTE;
    use uuid::Uuid;

    fn fixed_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 7).unwrap()
    }

    #[test]
    fn identical_inputs_produce_identical_keys() {
        let workspace = Uuid::new_v4();
        let position = Uuid::new_v4();
        let a = close_event_key(
            workspace,
            position,
            ExitReason::StopLoss,
            CloseSource::Sweep,
            fixed_date(),
        );
        let b = close_event_key(
            workspace,
            position,
            ExitReason::StopLoss,
            CloseSource::Sweep,
            fixed_date(),
        );
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn any_component_change_changes_the_key() {
        let workspace = Uuid::new_v4();
        let position = Uuid::new_v4();
        let base = close_event_key(
            workspace,
            position,
            ExitReason::StopLoss,
            CloseSource::Sweep,
            fixed_date(),
        );

        let other_reason = close_event_key(
            workspace,
            position,
            ExitReason::Target,
            CloseSource::Sweep,
            fixed_date(),
        );
        let other_source = close_event_key(
            workspace,
            position,
            ExitReason::StopLoss,
            CloseSource::Manual,
            fixed_date(),
        );
        let other_day = close_event_key(
            workspace,
            position,
            ExitReason::StopLoss,
            CloseSource::Sweep,
            NaiveDate::from_ymd_opt(2025, 6, 8).unwrap(),
        );
        assert_ne!(base, other_reason);
        assert_ne!(base, other_source);
        assert_ne!(base, other_day);
    }

    #[test]
    fn event_and_job_keys_never_collide() {
        let workspace = Uuid::new_v4();
        let position = Uuid::new_v4();
        let event = close_event_key(
            workspace,
            position,
            ExitReason::Target,
            CloseSource::Sweep,
            fixed_date(),
        );
        let job = recompute_job_key(
            workspace,
            position,
            ExitReason::Target,
            CloseSource::Sweep,
            fixed_date(),
            JOB_ANALYTICS_RECOMPUTE,
        );
        assert_ne!(event, job);
    }
}
