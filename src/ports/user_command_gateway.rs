//! User command gateway port (write side).
//!
//! The narrow persistence surface command handlers use for users. Writes
//! are staged in the caller's unit of work and reach storage on flush.

use async_trait::async_trait;

use super::DataMapperError;
use crate::domain::foundation::UserId;
use crate::domain::user::{User, UserChanges, Username};

#[async_trait]
pub trait UserCommandGateway: Send + Sync {
    /// Stages a new user.
    async fn add(&self, user: &User) -> Result<(), DataMapperError>;

    /// Returns `None` if not found.
    async fn read_by_id(&self, id: UserId) -> Result<Option<User>, DataMapperError>;

    /// Returns `None` if not found.
    async fn read_by_username(&self, username: &Username)
        -> Result<Option<User>, DataMapperError>;

    /// Applies `changes` to `user` and stages the update.
    async fn update(&self, user: &mut User, changes: UserChanges) -> Result<(), DataMapperError>;
}
