//! Password hashing configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Argon2id cost parameters
///
/// Defaults follow the argon2 crate's recommended parameters.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SecurityConfig {
    /// Memory cost in KiB
    #[serde(default = "default_memory_kib")]
    pub argon2_memory_kib: u32,

    /// Number of passes
    #[serde(default = "default_iterations")]
    pub argon2_iterations: u32,

    /// Degree of parallelism
    #[serde(default = "default_parallelism")]
    pub argon2_parallelism: u32,
}

impl SecurityConfig {
    /// Validate hashing parameters
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.argon2_iterations == 0 || self.argon2_parallelism == 0 {
            return Err(ValidationError::InvalidHashingCost);
        }
        // argon2 requires at least 8 KiB per lane
        if self.argon2_memory_kib < 8 * self.argon2_parallelism {
            return Err(ValidationError::InvalidHashingCost);
        }
        Ok(())
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            argon2_memory_kib: default_memory_kib(),
            argon2_iterations: default_iterations(),
            argon2_parallelism: default_parallelism(),
        }
    }
}

fn default_memory_kib() -> u32 {
    19 * 1024
}

fn default_iterations() -> u32 {
    2
}

fn default_parallelism() -> u32 {
    1
}
