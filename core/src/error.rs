//! Engine error types
//!
//! This module provides error types for the position lifecycle engine.

use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by the engine's storage and sink ports.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("store error: {0}")]
    Store(String),

    #[error("event sink error: {0}")]
    EventSink(String),

    #[error("job queue error: {0}")]
    JobQueue(String),

    #[error("position {0} not found")]
    PositionNotFound(Uuid),

    #[error("invalid {field}: {message}")]
    InvalidField { field: String, message: String },
}

impl EngineError {
    pub fn store(err: impl std::fmt::Display) -> Self {
        EngineError::Store(err.to_string())
    }

    pub fn invalid_field(field: impl Into<String>, message: impl std::fmt::Display) -> Self {
        EngineError::InvalidField {
            field: field.into(),
            message: message.to_string(),
        }
    }
}

/// Type alias for engine results
pub type EngineResult<T> = Result<T, EngineError>;
