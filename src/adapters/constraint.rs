//! Unique constraint metadata and violation translation.
//!
//! Both storage adapters report violations by constraint name. This module
//! owns the mapping from those names onto the errors the application
//! understands, so every adapter translates the same way.

use crate::domain::user::User;
use crate::ports::{DataMapperError, FlushError, Persistable};

/// Name of the unique constraint on `users.username`.
pub const USERNAME_UNIQUE: &str = "uq_users_username";

/// One unique value held by an entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UniqueKey {
    pub constraint: &'static str,
    pub value: String,
}

/// An entity whose unique columns are known to the adapters.
pub trait ConstrainedEntity: Persistable {
    /// Name of the primary key constraint.
    const PRIMARY_KEY: &'static str;

    /// Values that must be unique across all rows, tagged by constraint.
    fn unique_keys(&self) -> Vec<UniqueKey>;
}

impl ConstrainedEntity for User {
    const PRIMARY_KEY: &'static str = "users_pkey";

    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![UniqueKey {
            constraint: USERNAME_UNIQUE,
            value: self.username().to_string(),
        }]
    }
}

/// Maps a violated constraint onto a flush error.
///
/// `value` is the offending value when the adapter knows it.
pub fn translate_violation(constraint: &str, value: Option<&str>) -> FlushError {
    match (constraint, value) {
        (USERNAME_UNIQUE, Some(username)) => {
            FlushError::UsernameAlreadyExists(username.to_string())
        }
        _ => FlushError::DataMapper(DataMapperError::ConstraintViolation {
            constraint: constraint.to_string(),
        }),
    }
}
