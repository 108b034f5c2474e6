//! Password value objects and the hashing port.
//!
//! Plaintext passwords only ever live inside [`RawPassword`], which keeps the
//! value in a `secrecy` wrapper so it never shows up in `Debug` output or
//! logs. Persisted users carry a [`UserPasswordHash`] instead.

use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use thiserror::Error;

use crate::domain::foundation::DomainFieldError;

const FIELD: &str = "password";

/// Plaintext password supplied by a caller.
#[derive(Clone)]
pub struct RawPassword(SecretString);

impl RawPassword {
    pub const MIN_LEN: usize = 6;

    /// # Errors
    ///
    /// Returns `DomainFieldError` when the value is empty or shorter than
    /// [`RawPassword::MIN_LEN`].
    pub fn new(value: impl Into<String>) -> Result<Self, DomainFieldError> {
        let value = value.into();
        let len = value.chars().count();
        if len == 0 {
            return Err(DomainFieldError::empty_field(FIELD));
        }
        if len < Self::MIN_LEN {
            return Err(DomainFieldError::too_short(FIELD, Self::MIN_LEN, len));
        }
        Ok(Self(SecretString::new(value)))
    }

    /// Exposes the plaintext. Only hashers should call this.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for RawPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RawPassword([REDACTED])")
    }
}

/// Encoded password hash (PHC string format).
#[derive(Clone, PartialEq, Eq)]
pub struct UserPasswordHash(String);

impl UserPasswordHash {
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for UserPasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("UserPasswordHash([REDACTED])")
    }
}

/// Failure inside a password hashing backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Password hashing failed: {0}")]
pub struct PasswordHashError(pub String);

/// Port for one-way password hashing.
///
/// Hashing is CPU bound, so the port is synchronous.
pub trait PasswordHasher: Send + Sync {
    /// Hashes a plaintext password with a fresh salt.
    ///
    /// # Errors
    ///
    /// Returns `PasswordHashError` when the backend rejects the input or
    /// its parameters.
    fn hash(&self, raw: &RawPassword) -> Result<UserPasswordHash, PasswordHashError>;

    /// Checks a plaintext password against a stored hash.
    ///
    /// # Errors
    ///
    /// Returns `PasswordHashError` when the stored hash cannot be parsed.
    fn verify(&self, raw: &RawPassword, hash: &UserPasswordHash)
        -> Result<bool, PasswordHashError>;
}
