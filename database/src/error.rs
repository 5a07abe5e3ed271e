//! Database error types
//!
//! This module provides error types for database operations.

use thiserror::Error;

/// Database-related errors
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),
}

/// Type alias for database results
pub type DatabaseResult<T> = Result<T, DatabaseError>;
