//! Generic repository over the in-memory store.

use async_trait::async_trait;
use std::marker::PhantomData;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::database::InMemoryDatabase;
use super::entity::MemoryEntity;
use super::table::{Mutation, StagedOp};
use super::unit_of_work::MemoryTxState;
use crate::ports::{DataMapperError, Pagination, Repository, Sorting, SortingOrder};

/// Repository bound to one [`InMemoryUnitOfWork`](super::InMemoryUnitOfWork).
///
/// Reads see committed rows plus this unit of work's flushed writes.
pub struct InMemoryRepository<E> {
    db: InMemoryDatabase,
    state: Arc<Mutex<MemoryTxState>>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: MemoryEntity> InMemoryRepository<E> {
    pub(super) fn new(db: InMemoryDatabase, state: Arc<Mutex<MemoryTxState>>) -> Self {
        Self {
            db,
            state,
            _entity: PhantomData,
        }
    }

    async fn visible(&self, operation: &'static str) -> Result<Vec<E>, DataMapperError> {
        let state = self.state.lock().await;
        state.status.ensure_active(operation)?;
        self.db.view::<E>(&state.flushed)
    }

    async fn matching(
        &self,
        operation: &'static str,
        criteria: &E::Criteria,
    ) -> Result<Vec<E>, DataMapperError> {
        Ok(self
            .visible(operation)
            .await?
            .into_iter()
            .filter(|row| row.matches(criteria))
            .collect())
    }

    async fn stage(&self, mutations: Vec<Mutation<E>>) -> Result<(), DataMapperError> {
        let mut state = self.state.lock().await;
        state.status.ensure_active("stage write")?;
        state
            .pending
            .extend(mutations.into_iter().map(|m| Box::new(m) as Box<dyn StagedOp>));
        Ok(())
    }
}

#[async_trait]
impl<E: MemoryEntity> Repository<E> for InMemoryRepository<E> {
    async fn get(&self, id: &E::Id) -> Result<Option<E>, DataMapperError> {
        Ok(self
            .visible("get")
            .await?
            .into_iter()
            .find(|row| row.id() == id))
    }

    async fn one(&self, criteria: &E::Criteria) -> Result<Option<E>, DataMapperError> {
        let mut rows = self.matching("one", criteria).await?;
        if rows.len() > 1 {
            return Err(DataMapperError::MultipleResults { entity: E::NAME });
        }
        Ok(rows.pop())
    }

    async fn all(
        &self,
        pagination: Option<Pagination>,
        sorting: Option<Sorting<E::SortField>>,
        criteria: &E::Criteria,
    ) -> Result<Vec<E>, DataMapperError> {
        let mut rows = self.matching("all", criteria).await?;
        if let Some(sorting) = sorting {
            rows.sort_by(|a, b| {
                let ordering = a.compare(b, sorting.field);
                match sorting.order {
                    SortingOrder::Asc => ordering,
                    SortingOrder::Desc => ordering.reverse(),
                }
            });
        }
        Ok(match pagination {
            Some(pagination) => pagination.apply(rows),
            None => rows,
        })
    }

    async fn exists(&self, criteria: &E::Criteria) -> Result<bool, DataMapperError> {
        Ok(self
            .visible("exists")
            .await?
            .iter()
            .any(|row| row.matches(criteria)))
    }

    async fn create(&self, entity: &E) -> Result<(), DataMapperError> {
        self.stage(vec![Mutation::Insert(entity.clone())]).await
    }

    async fn create_all(&self, entities: &[E]) -> Result<(), DataMapperError> {
        self.stage(entities.iter().cloned().map(Mutation::Insert).collect())
            .await
    }

    async fn update(&self, entity: &mut E, changes: E::Changes) -> Result<(), DataMapperError> {
        entity.apply_changes(&changes);
        self.stage(vec![Mutation::Update(entity.clone())]).await
    }

    async fn delete(&self, entity: &E) -> Result<(), DataMapperError> {
        self.stage(vec![Mutation::Delete(entity.id().clone())]).await
    }
}
