//! Database configuration

use serde::Deserialize;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;

use super::error::ValidationError;

/// Upper bound on `pool.max_connections`.
pub const MAX_POOL_SIZE: u32 = 100;

/// PostgreSQL connection settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseConfig {
    /// `postgres://` or `postgresql://` URL
    pub url: String,

    #[serde(default)]
    pub pool: PoolConfig,

    /// Apply pending migrations on startup
    #[serde(default)]
    pub run_migrations: bool,
}

/// Connection pool sizing and timeouts
///
/// Set through `USER_ACCOUNTS__DATABASE__POOL__*`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    pub min_connections: u32,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            min_connections: 1,
            max_connections: 10,
            acquire_timeout_secs: 30,
            idle_timeout_secs: 600,
        }
    }
}

impl DatabaseConfig {
    /// Pool options derived from the `pool` section
    pub fn pool_options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .min_connections(self.pool.min_connections)
            .max_connections(self.pool.max_connections)
            .acquire_timeout(Duration::from_secs(self.pool.acquire_timeout_secs))
            .idle_timeout(Some(Duration::from_secs(self.pool.idle_timeout_secs)))
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.url.split_once("://") {
            None if self.url.is_empty() => {
                return Err(ValidationError::MissingRequired("DATABASE__URL"))
            }
            Some(("postgres" | "postgresql", rest)) if !rest.is_empty() => {}
            _ => return Err(ValidationError::InvalidDatabaseUrl),
        }

        let PoolConfig {
            min_connections,
            max_connections,
            ..
        } = self.pool;
        if max_connections == 0 || min_connections > max_connections {
            return Err(ValidationError::InvalidPoolSize {
                min: min_connections,
                max: max_connections,
            });
        }
        if max_connections > MAX_POOL_SIZE {
            return Err(ValidationError::PoolSizeTooLarge(max_connections));
        }
        Ok(())
    }
}
