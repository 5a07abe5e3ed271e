//! # PostgreSQL Connection Management
//!
//! Connection pooling via SQLx with health checking.

use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::{debug, info, instrument};

use crate::config::DatabaseConfig;
use crate::error::{DatabaseError, DatabaseResult};

/// Database manager owning the PostgreSQL connection pool
pub struct DatabaseManager {
    pool: PgPool,
    config: DatabaseConfig,
}

impl DatabaseManager {
    /// Create a new database manager with the given configuration
    #[instrument(skip(config))]
    pub async fn connect(config: DatabaseConfig) -> DatabaseResult<Self> {
        config.validate()?;
        info!("Initializing database connection pool");

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout)
            .idle_timeout(config.idle_timeout)
            .max_lifetime(config.max_lifetime)
            .connect(&config.database_url)
            .await?;

        let version: String = sqlx::query_scalar("SELECT version()")
            .fetch_one(&pool)
            .await?;
        info!("Connected to PostgreSQL: {}", version);

        Ok(Self { pool, config })
    }

    /// Wrap an externally created pool (tests, embedded setups).
    pub fn from_pool(pool: PgPool) -> Self {
        Self {
            pool,
            config: DatabaseConfig::default(),
        }
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Get the current database configuration
    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// Check database health
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> DatabaseResult<()> {
        debug!("Performing database health check");

        let result: (i32,) = sqlx::query_as("SELECT 1 as health")
            .fetch_one(&self.pool)
            .await?;

        if result.0 == 1 {
            Ok(())
        } else {
            Err(DatabaseError::Connection(
                "health check returned unexpected result".to_string(),
            ))
        }
    }

    /// Get connection pool size
    pub fn pool_size(&self) -> u32 {
        self.pool.size()
    }

    /// Get number of idle connections
    pub fn idle_connections(&self) -> u32 {
        self.pool.num_idle() as u32
    }
}
