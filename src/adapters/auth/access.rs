//! In-memory access registry.

use async_trait::async_trait;
use std::collections::HashSet;
use tokio::sync::RwLock;
use tracing::info;

use crate::domain::foundation::UserId;
use crate::ports::{AccessRevoker, DataMapperError};

/// Tracks which users hold live access and drops them on revocation.
#[derive(Debug, Default)]
pub struct InMemoryAccessRevoker {
    granted: RwLock<HashSet<UserId>>,
}

impl InMemoryAccessRevoker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `user_id` holds live access.
    pub async fn grant(&self, user_id: UserId) {
        self.granted.write().await.insert(user_id);
    }

    pub async fn has_access(&self, user_id: UserId) -> bool {
        self.granted.read().await.contains(&user_id)
    }
}

#[async_trait]
impl AccessRevoker for InMemoryAccessRevoker {
    async fn remove_all_user_access(&self, user_id: UserId) -> Result<(), DataMapperError> {
        let removed = self.granted.write().await.remove(&user_id);
        info!(%user_id, removed, "Revoked user access");
        Ok(())
    }
}
