//! In-memory user query gateway.

use async_trait::async_trait;

use super::database::InMemoryDatabase;
use super::entity::MemoryEntity;
use crate::domain::user::User;
use crate::ports::{
    DataMapperError, SortingOrder, UserListParams, UserQueryGateway, UserQueryModel,
};

/// Reads committed users, outside any unit of work.
#[derive(Clone)]
pub struct InMemoryUserReader {
    db: InMemoryDatabase,
}

impl InMemoryUserReader {
    pub fn new(db: InMemoryDatabase) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserQueryGateway for InMemoryUserReader {
    async fn read_all(
        &self,
        params: &UserListParams,
    ) -> Result<Vec<UserQueryModel>, DataMapperError> {
        let mut users = self.db.rows::<User>()?;
        let sorting = params.sorting;
        users.sort_by(|a, b| {
            let ordering = a.compare(b, sorting.field);
            match sorting.order {
                SortingOrder::Asc => ordering,
                SortingOrder::Desc => ordering.reverse(),
            }
        });

        Ok(params
            .pagination
            .apply(users.iter().map(UserQueryModel::from)))
    }
}
