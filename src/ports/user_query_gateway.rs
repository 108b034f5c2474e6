//! User query gateway port (read side / CQRS queries).
//!
//! Reads projections straight from storage, bypassing the entity model
//! and the unit of work.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{DataMapperError, Pagination, Sorting};
use crate::domain::foundation::UserId;
use crate::domain::user::{User, UserRole, UserSortField};

/// Read-only view of a user. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserQueryModel {
    pub id: UserId,
    pub username: String,
    pub role: UserRole,
    pub is_active: bool,
}

impl From<&User> for UserQueryModel {
    fn from(user: &User) -> Self {
        Self {
            id: user.id(),
            username: user.username().to_string(),
            role: user.role(),
            is_active: user.is_active(),
        }
    }
}

/// Page and order for a user listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserListParams {
    pub pagination: Pagination,
    pub sorting: Sorting<UserSortField>,
}

#[async_trait]
pub trait UserQueryGateway: Send + Sync {
    /// Lists users ordered by `params.sorting`, windowed by
    /// `params.pagination`. An empty store yields an empty vec.
    async fn read_all(&self, params: &UserListParams)
        -> Result<Vec<UserQueryModel>, DataMapperError>;
}
