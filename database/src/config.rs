//! # Database Configuration
//!
//! Configuration for the PostgreSQL connection pool, environment-based with
//! validation and defaults.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{DatabaseError, DatabaseResult};

/// Database configuration for PostgreSQL connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of connections in the pool
    pub min_connections: u32,
    /// Connection acquisition timeout
    pub acquire_timeout: Duration,
    /// Connection idle timeout
    pub idle_timeout: Duration,
    /// Connection max lifetime
    pub max_lifetime: Duration,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgresql://localhost:5432/tradewind".to_string()),
            max_connections: 20,
            min_connections: 2,
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            max_lifetime: Duration::from_secs(1800),
        }
    }
}

impl DatabaseConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> DatabaseResult<Self> {
        let config = Self::default();
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> DatabaseResult<()> {
        if self.database_url.is_empty() {
            return Err(DatabaseError::Configuration(
                "database URL cannot be empty".to_string(),
            ));
        }
        if self.max_connections < self.min_connections {
            return Err(DatabaseError::Configuration(
                "max connections must be >= min connections".to_string(),
            ));
        }
        Ok(())
    }
}
