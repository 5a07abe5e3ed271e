//! Position lifecycle engine.
//!
//! Periodically re-evaluates every open position against live price, decides
//! whether a close condition fired (stop-loss first, then target, then time
//! expiry), and closes triggered positions exactly once through the store's
//! row-locked transaction. Event emission and downstream job enqueueing are
//! best-effort and idempotent via deterministic dedupe keys.

pub mod dedupe;
pub mod evaluator;
pub mod sweep;

pub use dedupe::{close_event_key, recompute_job_key};
pub use evaluator::{close_reason, DEFAULT_MAX_HOLD_DAYS};
pub use sweep::{CloseDecision, SweepConfig, SweepEngine, SweepFailure, SweepReport};
