//! `UserCommandGateway` backed by the generic repository.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::foundation::UserId;
use crate::domain::user::{User, UserChanges, UserCriteria, Username};
use crate::ports::{DataMapperError, Repository, UserCommandGateway};

pub struct RepositoryUserGateway {
    repository: Arc<dyn Repository<User>>,
}

impl RepositoryUserGateway {
    pub fn new(repository: Arc<dyn Repository<User>>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl UserCommandGateway for RepositoryUserGateway {
    async fn add(&self, user: &User) -> Result<(), DataMapperError> {
        self.repository.create(user).await
    }

    async fn read_by_id(&self, id: UserId) -> Result<Option<User>, DataMapperError> {
        self.repository.get(&id).await
    }

    async fn read_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, DataMapperError> {
        self.repository
            .one(&UserCriteria::by_username(username.clone()))
            .await
    }

    async fn update(&self, user: &mut User, changes: UserChanges) -> Result<(), DataMapperError> {
        self.repository.update(user, changes).await
    }
}
