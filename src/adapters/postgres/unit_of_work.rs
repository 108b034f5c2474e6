//! PostgreSQL unit of work.
//!
//! Owns one database transaction. Repositories stage writes as
//! [`StagedWrite`]s; `flush` sends them inside a savepoint so a rejected
//! batch leaves the transaction usable, and `commit` flushes then commits.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

use super::entity::PgEntity;
use super::repository::PostgresRepository;
use super::statement::StagedWrite;
use crate::ports::{
    AppUnitOfWork, DataMapperError, FlushError, Repository, RepositoryFactory,
    TransactionStatus, UnitOfWork, UnitOfWorkFactory,
};

const FLUSH_SAVEPOINT: &str = "uow_flush";

pub(super) struct PgTxState {
    pub status: TransactionStatus,
    pub tx: Option<Transaction<'static, Postgres>>,
    pub pending: Vec<StagedWrite>,
}

impl PgTxState {
    /// The open transaction, if the unit of work is active.
    pub fn active_tx(
        &mut self,
        operation: &'static str,
    ) -> Result<&mut Transaction<'static, Postgres>, DataMapperError> {
        self.status.ensure_active(operation)?;
        let status = self.status;
        self.tx.as_mut().ok_or_else(|| status.reject(operation))
    }

    async fn flush(&mut self) -> Result<(), FlushError> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let writes = std::mem::take(&mut self.pending);
        let tx = self.active_tx("flush")?;

        savepoint(tx, "SAVEPOINT").await?;
        for write in &writes {
            let result = write.build().build().execute(&mut **tx).await;
            if let Err(err) = result {
                let translated = write.translate(err);
                debug!(error = %translated, "Flush rejected, rolling back to savepoint");
                savepoint(tx, "ROLLBACK TO SAVEPOINT").await?;
                return Err(translated);
            }
        }
        savepoint(tx, "RELEASE SAVEPOINT").await?;

        debug!(count = writes.len(), "Flushed staged writes");
        Ok(())
    }
}

async fn savepoint(
    tx: &mut Transaction<'static, Postgres>,
    command: &str,
) -> Result<(), DataMapperError> {
    sqlx::query(&format!("{} {}", command, FLUSH_SAVEPOINT))
        .execute(&mut **tx)
        .await
        .map(|_| ())
        .map_err(|e| DataMapperError::QueryFailed(format!("{} failed: {}", command, e)))
}

/// Unit of work over a PostgreSQL pool.
pub struct PostgresUnitOfWork {
    pool: PgPool,
    state: Arc<Mutex<PgTxState>>,
}

impl PostgresUnitOfWork {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            state: Arc::new(Mutex::new(PgTxState {
                status: TransactionStatus::NotStarted,
                tx: None,
                pending: Vec::new(),
            })),
        }
    }
}

#[async_trait]
impl UnitOfWork for PostgresUnitOfWork {
    async fn begin(&self) -> Result<(), DataMapperError> {
        let mut state = self.state.lock().await;
        if state.status != TransactionStatus::NotStarted {
            return Err(state.status.reject("begin"));
        }

        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DataMapperError::Connection(format!("Failed to begin transaction: {}", e)))?;
        state.tx = Some(tx);
        state.status = TransactionStatus::Active;
        Ok(())
    }

    async fn flush(&self) -> Result<(), FlushError> {
        let mut state = self.state.lock().await;
        state.status.ensure_active("flush")?;
        state.flush().await
    }

    async fn commit(&self) -> Result<(), DataMapperError> {
        let mut state = self.state.lock().await;
        match state.status {
            TransactionStatus::Committed => return Ok(()),
            other => other.ensure_active("commit")?,
        }

        let flushed = state.flush().await;
        let outcome = match (flushed, state.tx.take()) {
            (Ok(()), Some(tx)) => tx.commit().await.map_err(|e| e.to_string()),
            (Ok(()), None) => Err("transaction already closed".to_string()),
            (Err(err), tx) => {
                if let Some(tx) = tx {
                    if let Err(e) = tx.rollback().await {
                        error!(error = %e, "Rollback after failed flush also failed");
                    }
                }
                Err(err.to_string())
            }
        };

        state.pending.clear();
        match outcome {
            Ok(()) => {
                state.status = TransactionStatus::Committed;
                debug!("Committed transaction");
                Ok(())
            }
            Err(reason) => {
                warn!(%reason, "Commit failed, transaction rolled back");
                state.status = TransactionStatus::RolledBack;
                Err(DataMapperError::CommitFailed(reason))
            }
        }
    }

    async fn rollback(&self) -> Result<(), DataMapperError> {
        let mut state = self.state.lock().await;
        match state.status {
            TransactionStatus::Committed | TransactionStatus::RolledBack => return Ok(()),
            TransactionStatus::NotStarted => {
                return Err(TransactionStatus::NotStarted.reject("rollback"))
            }
            TransactionStatus::Active => {}
        }

        state.pending.clear();
        state.status = TransactionStatus::RolledBack;
        match state.tx.take() {
            Some(tx) => tx.rollback().await.map_err(|e| {
                DataMapperError::RollbackFailed(format!("Failed to roll back: {}", e))
            }),
            None => Ok(()),
        }
    }

    async fn status(&self) -> TransactionStatus {
        self.state.lock().await.status
    }
}

impl<E: PgEntity> RepositoryFactory<E> for PostgresUnitOfWork {
    fn repository(&self) -> Arc<dyn Repository<E>> {
        Arc::new(PostgresRepository::<E>::new(self.state.clone()))
    }
}

/// Opens a fresh [`PostgresUnitOfWork`] per request.
#[derive(Clone)]
pub struct PostgresUnitOfWorkFactory {
    pool: PgPool,
}

impl PostgresUnitOfWorkFactory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl UnitOfWorkFactory for PostgresUnitOfWorkFactory {
    fn create(&self) -> Arc<dyn AppUnitOfWork> {
        Arc::new(PostgresUnitOfWork::new(self.pool.clone()))
    }
}
