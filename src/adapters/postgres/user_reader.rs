//! PostgreSQL implementation of UserQueryGateway.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::entity::PgEntity;
use super::user_mapping::corrupt_row;
use crate::domain::foundation::UserId;
use crate::domain::user::{User, UserRole};
use crate::ports::{DataMapperError, UserListParams, UserQueryGateway, UserQueryModel};

/// Reads user projections straight from the pool, outside any unit of work.
#[derive(Clone)]
pub struct PostgresUserReader {
    pool: PgPool,
}

impl std::fmt::Debug for PostgresUserReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresUserReader")
            .field("pool", &"PgPool")
            .finish()
    }
}

impl PostgresUserReader {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row for the user listing.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: uuid::Uuid,
    username: String,
    role: String,
    is_active: bool,
}

impl TryFrom<UserRow> for UserQueryModel {
    type Error = DataMapperError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(UserQueryModel {
            id: UserId::from_uuid(row.id),
            username: row.username,
            role: row.role.parse::<UserRole>().map_err(corrupt_row)?,
            is_active: row.is_active,
        })
    }
}

fn list_query(params: &UserListParams) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!(
        "SELECT id, username, role, is_active FROM users ORDER BY {} {}, id",
        User::sort_column(params.sorting.field),
        params.sorting.order.as_sql()
    ));
    builder.push(" LIMIT ");
    builder.push_bind(i64::from(params.pagination.limit()));
    builder.push(" OFFSET ");
    builder.push_bind(i64::try_from(params.pagination.offset()).unwrap_or(i64::MAX));
    builder
}

#[async_trait]
impl UserQueryGateway for PostgresUserReader {
    async fn read_all(
        &self,
        params: &UserListParams,
    ) -> Result<Vec<UserQueryModel>, DataMapperError> {
        let rows: Vec<UserRow> = list_query(params)
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DataMapperError::QueryFailed(format!("Failed to list users: {}", e)))?;

        rows.into_iter().map(UserQueryModel::try_from).collect()
    }
}
