//! Access revoker port.
//!
//! Used when a user loses the right to act: deactivation, demotion, or a
//! request made by a user that no longer exists.

use async_trait::async_trait;

use super::DataMapperError;
use crate::domain::foundation::UserId;

#[async_trait]
pub trait AccessRevoker: Send + Sync {
    /// Terminates every session and credential issued to `user_id`.
    ///
    /// Revoking a user with no active access succeeds.
    async fn remove_all_user_access(&self, user_id: UserId) -> Result<(), DataMapperError>;
}
