//! # Database Layer
//!
//! PostgreSQL persistence for the Tradewind lifecycle engine using SQLx with
//! connection pooling and transaction support. Implements the core crate's
//! storage ports: the row-locked position close, the idempotent lifecycle
//! event store, and the idempotent recompute-job queue.

pub mod config;
pub mod connection;
pub mod error;
pub mod events;
pub mod jobs;
pub mod positions;
pub mod schema;

// Re-export commonly used types
pub use config::DatabaseConfig;
pub use connection::DatabaseManager;
pub use error::{DatabaseError, DatabaseResult};
pub use events::PgLifecycleEventSink;
pub use jobs::PgRecomputeJobQueue;
pub use positions::PgPositionStore;
pub use schema::ensure_schema;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
