//! Configuration error types

use thiserror::Error;

/// Loading or validating configuration failed
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// A loaded value is out of range or malformed
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Database URL must use the postgres:// or postgresql:// scheme")]
    InvalidDatabaseUrl,

    #[error("Invalid pool size: min {min}, max {max}")]
    InvalidPoolSize { min: u32, max: u32 },

    #[error("Pool size {0} exceeds the maximum of {}", super::database::MAX_POOL_SIZE)]
    PoolSizeTooLarge(u32),

    #[error("Invalid password hashing cost parameters")]
    InvalidHashingCost,
}
