//! Core domain types for the Tradewind position lifecycle engine.
//!
//! This crate defines the journaled position model, the realized-performance
//! math, the lifecycle event and recompute-job messages, and the storage/sink
//! ports the engine operates through. It holds no I/O of its own.

pub mod error;
pub mod ports;
pub mod types;

pub use error::{EngineError, EngineResult};
pub use ports::{LifecycleEventSink, PositionStore, RecomputeJobQueue};
pub use types::*;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
