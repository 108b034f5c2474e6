//! Generic repository over PostgreSQL.

use async_trait::async_trait;
use sqlx::Row;
use std::marker::PhantomData;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::entity::{id_column, push_filters, select_where, PgEntity};
use super::statement::StagedWrite;
use super::unit_of_work::PgTxState;
use crate::ports::{DataMapperError, Pagination, Repository, Sorting};

/// Repository bound to one [`PostgresUnitOfWork`](super::PostgresUnitOfWork).
///
/// Reads run inside the unit of work's transaction, so they see flushed
/// writes. Writes are staged until the next flush.
pub struct PostgresRepository<E> {
    state: Arc<Mutex<PgTxState>>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: PgEntity> PostgresRepository<E> {
    pub(super) fn new(state: Arc<Mutex<PgTxState>>) -> Self {
        Self {
            state,
            _entity: PhantomData,
        }
    }

    async fn stage(&self, writes: Vec<StagedWrite>) -> Result<(), DataMapperError> {
        let mut state = self.state.lock().await;
        state.status.ensure_active("stage write")?;
        state.pending.extend(writes);
        Ok(())
    }
}

fn query_failed(entity: &str, e: sqlx::Error) -> DataMapperError {
    DataMapperError::QueryFailed(format!("Failed to query {}: {}", entity, e))
}

#[async_trait]
impl<E: PgEntity> Repository<E> for PostgresRepository<E> {
    async fn get(&self, id: &E::Id) -> Result<Option<E>, DataMapperError> {
        let mut builder = sqlx::QueryBuilder::new(format!(
            "SELECT {} FROM {}",
            E::COLUMNS.join(", "),
            E::TABLE
        ));
        push_filters(&mut builder, vec![(id_column::<E>(), E::id_value(id))]);

        let mut state = self.state.lock().await;
        let tx = state.active_tx("get")?;
        let row = builder
            .build()
            .fetch_optional(&mut **tx)
            .await
            .map_err(|e| query_failed(E::NAME, e))?;

        row.as_ref().map(E::from_row).transpose()
    }

    async fn one(&self, criteria: &E::Criteria) -> Result<Option<E>, DataMapperError> {
        let mut builder = select_where::<E>(criteria);
        builder.push(" LIMIT 2");

        let mut state = self.state.lock().await;
        let tx = state.active_tx("one")?;
        let rows = builder
            .build()
            .fetch_all(&mut **tx)
            .await
            .map_err(|e| query_failed(E::NAME, e))?;

        match rows.as_slice() {
            [] => Ok(None),
            [row] => E::from_row(row).map(Some),
            _ => Err(DataMapperError::MultipleResults { entity: E::NAME }),
        }
    }

    async fn all(
        &self,
        pagination: Option<Pagination>,
        sorting: Option<Sorting<E::SortField>>,
        criteria: &E::Criteria,
    ) -> Result<Vec<E>, DataMapperError> {
        let mut builder = select_where::<E>(criteria);
        if let Some(sorting) = sorting {
            // Columns come from the entity's allow-list, never from input.
            builder.push(format!(
                " ORDER BY {} {}, {}",
                E::sort_column(sorting.field),
                sorting.order.as_sql(),
                id_column::<E>()
            ));
        }
        if let Some(pagination) = pagination {
            builder.push(" LIMIT ");
            builder.push_bind(i64::from(pagination.limit()));
            builder.push(" OFFSET ");
            builder.push_bind(i64::try_from(pagination.offset()).unwrap_or(i64::MAX));
        }

        let mut state = self.state.lock().await;
        let tx = state.active_tx("all")?;
        let rows = builder
            .build()
            .fetch_all(&mut **tx)
            .await
            .map_err(|e| query_failed(E::NAME, e))?;

        rows.iter().map(E::from_row).collect()
    }

    async fn exists(&self, criteria: &E::Criteria) -> Result<bool, DataMapperError> {
        let mut builder = sqlx::QueryBuilder::new(format!("SELECT EXISTS (SELECT 1 FROM {}", E::TABLE));
        push_filters(&mut builder, E::filters(criteria));
        builder.push(")");

        let mut state = self.state.lock().await;
        let tx = state.active_tx("exists")?;
        let row = builder
            .build()
            .fetch_one(&mut **tx)
            .await
            .map_err(|e| query_failed(E::NAME, e))?;

        row.try_get::<bool, _>(0)
            .map_err(|e| query_failed(E::NAME, e))
    }

    async fn create(&self, entity: &E) -> Result<(), DataMapperError> {
        self.stage(vec![StagedWrite::insert(entity)]).await
    }

    async fn create_all(&self, entities: &[E]) -> Result<(), DataMapperError> {
        self.stage(entities.iter().map(StagedWrite::insert).collect())
            .await
    }

    async fn update(&self, entity: &mut E, changes: E::Changes) -> Result<(), DataMapperError> {
        entity.apply_changes(&changes);
        self.stage(vec![StagedWrite::update(&*entity)]).await
    }

    async fn delete(&self, entity: &E) -> Result<(), DataMapperError> {
        self.stage(vec![StagedWrite::delete(entity)]).await
    }
}
