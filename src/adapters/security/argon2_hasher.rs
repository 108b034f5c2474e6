//! Argon2id password hashing.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, SaltString};
use argon2::{Algorithm, Argon2, Params, PasswordHasher as _, PasswordVerifier, Version};

use crate::config::SecurityConfig;
use crate::domain::user::{PasswordHashError, PasswordHasher, RawPassword, UserPasswordHash};

/// Hashes passwords into PHC strings with a random salt per hash.
///
/// Verification reads the parameters stored in the hash, so changing the
/// configured cost does not invalidate existing passwords.
#[derive(Default)]
pub struct Argon2PasswordHasher {
    params: Params,
}

impl Argon2PasswordHasher {
    /// Builds a hasher from configured cost parameters.
    ///
    /// # Errors
    ///
    /// Returns `PasswordHashError` when argon2 rejects the parameters.
    pub fn from_config(config: &SecurityConfig) -> Result<Self, PasswordHashError> {
        let params = Params::new(
            config.argon2_memory_kib,
            config.argon2_iterations,
            config.argon2_parallelism,
            None,
        )
        .map_err(|e| PasswordHashError(e.to_string()))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, raw: &RawPassword) -> Result<UserPasswordHash, PasswordHashError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2()
            .hash_password(raw.expose().as_bytes(), &salt)
            .map(|hash| UserPasswordHash::new(hash.to_string()))
            .map_err(|e| PasswordHashError(e.to_string()))
    }

    fn verify(
        &self,
        raw: &RawPassword,
        hash: &UserPasswordHash,
    ) -> Result<bool, PasswordHashError> {
        let parsed = PasswordHash::new(hash.as_str()).map_err(|e| PasswordHashError(e.to_string()))?;
        Ok(self
            .argon2()
            .verify_password(raw.expose().as_bytes(), &parsed)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap() -> Argon2PasswordHasher {
        Argon2PasswordHasher::from_config(&SecurityConfig {
            argon2_memory_kib: 64,
            argon2_iterations: 1,
            argon2_parallelism: 1,
        })
        .unwrap()
    }

    #[test]
    fn hash_verifies_against_same_password() {
        let hasher = cheap();
        let password = RawPassword::new("secret1").unwrap();

        let hash = hasher.hash(&password).unwrap();

        assert!(hash.as_str().starts_with("$argon2id$"));
        assert!(hasher.verify(&password, &hash).unwrap());
    }

    #[test]
    fn wrong_password_does_not_verify() {
        let hasher = cheap();
        let hash = hasher.hash(&RawPassword::new("secret1").unwrap()).unwrap();

        assert!(!hasher
            .verify(&RawPassword::new("secret2").unwrap(), &hash)
            .unwrap());
    }

    #[test]
    fn salts_differ_between_hashes() {
        let hasher = cheap();
        let password = RawPassword::new("secret1").unwrap();
        assert_ne!(
            hasher.hash(&password).unwrap().as_str(),
            hasher.hash(&password).unwrap().as_str()
        );
    }

    #[test]
    fn malformed_hash_is_an_error() {
        let hasher = cheap();
        let result = hasher.verify(
            &RawPassword::new("secret1").unwrap(),
            &UserPasswordHash::new("not-a-phc-string"),
        );
        assert!(result.is_err());
    }

    #[test]
    fn rejects_invalid_parameters() {
        let result = Argon2PasswordHasher::from_config(&SecurityConfig {
            argon2_memory_kib: 1,
            argon2_iterations: 1,
            argon2_parallelism: 1,
        });
        assert!(result.is_err());
    }
}
