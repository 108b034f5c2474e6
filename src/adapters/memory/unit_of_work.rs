//! In-memory unit of work.
//!
//! Writes are staged as pending operations. `flush` checks them against
//! committed data plus everything flushed before, so constraint violations
//! surface at the same point they would against a real database, including
//! unique values another live unit of work has already flushed. `commit`
//! applies the flushed operations to the shared store atomically.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::database::{InMemoryDatabase, OwnerId};
use super::entity::MemoryEntity;
use super::repository::InMemoryRepository;
use super::table::StagedOp;
use crate::ports::{
    AppUnitOfWork, DataMapperError, FlushError, Repository, RepositoryFactory,
    TransactionStatus, UnitOfWork, UnitOfWorkFactory,
};

pub(super) struct MemoryTxState {
    owner: OwnerId,
    pub status: TransactionStatus,
    /// Staged but not yet flushed.
    pub pending: Vec<Box<dyn StagedOp>>,
    /// Flushed, visible to this unit of work's reads, not yet committed.
    pub flushed: Vec<Box<dyn StagedOp>>,
}

impl MemoryTxState {
    fn new(owner: OwnerId) -> Self {
        Self {
            owner,
            status: TransactionStatus::NotStarted,
            pending: Vec::new(),
            flushed: Vec::new(),
        }
    }

    fn flush(&mut self, db: &InMemoryDatabase) -> Result<(), FlushError> {
        if self.pending.is_empty() {
            return Ok(());
        }

        let ops: Vec<&dyn StagedOp> = self
            .flushed
            .iter()
            .chain(self.pending.iter())
            .map(|op| op.as_ref())
            .collect();
        let pending: Vec<&dyn StagedOp> = self.pending.iter().map(|op| op.as_ref()).collect();
        if let Err(err) = db
            .validate(&ops)
            .and_then(|()| db.reserve(self.owner, &pending))
        {
            self.pending.clear();
            return Err(err);
        }

        debug!(count = self.pending.len(), "Flushed staged operations");
        self.flushed.append(&mut self.pending);
        Ok(())
    }

    fn discard(&mut self, db: &InMemoryDatabase) {
        self.pending.clear();
        self.flushed.clear();
        db.release(self.owner);
    }
}

/// Unit of work over an [`InMemoryDatabase`].
pub struct InMemoryUnitOfWork {
    db: InMemoryDatabase,
    owner: OwnerId,
    state: Arc<Mutex<MemoryTxState>>,
}

impl InMemoryUnitOfWork {
    pub fn new(db: InMemoryDatabase) -> Self {
        let owner = db.register();
        Self {
            db,
            owner,
            state: Arc::new(Mutex::new(MemoryTxState::new(owner))),
        }
    }
}

impl Drop for InMemoryUnitOfWork {
    fn drop(&mut self) {
        self.db.release(self.owner);
    }
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    async fn begin(&self) -> Result<(), DataMapperError> {
        let mut state = self.state.lock().await;
        match state.status {
            TransactionStatus::NotStarted => {
                state.status = TransactionStatus::Active;
                Ok(())
            }
            other => Err(other.reject("begin")),
        }
    }

    async fn flush(&self) -> Result<(), FlushError> {
        let mut state = self.state.lock().await;
        state.status.ensure_active("flush")?;
        state.flush(&self.db)
    }

    async fn commit(&self) -> Result<(), DataMapperError> {
        let mut state = self.state.lock().await;
        match state.status {
            TransactionStatus::Committed => return Ok(()),
            other => other.ensure_active("commit")?,
        }

        let outcome = state
            .flush(&self.db)
            .and_then(|()| self.db.apply_all(&state.flushed));

        match outcome {
            Ok(()) => {
                state.discard(&self.db);
                state.status = TransactionStatus::Committed;
                debug!("Committed in-memory transaction");
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "In-memory commit failed, rolling back");
                state.discard(&self.db);
                state.status = TransactionStatus::RolledBack;
                Err(DataMapperError::CommitFailed(err.to_string()))
            }
        }
    }

    async fn rollback(&self) -> Result<(), DataMapperError> {
        let mut state = self.state.lock().await;
        match state.status {
            TransactionStatus::Active => {
                state.discard(&self.db);
                state.status = TransactionStatus::RolledBack;
                debug!("Rolled back in-memory transaction");
                Ok(())
            }
            TransactionStatus::Committed | TransactionStatus::RolledBack => Ok(()),
            TransactionStatus::NotStarted => Err(TransactionStatus::NotStarted.reject("rollback")),
        }
    }

    async fn status(&self) -> TransactionStatus {
        self.state.lock().await.status
    }
}

impl<E: MemoryEntity> RepositoryFactory<E> for InMemoryUnitOfWork {
    fn repository(&self) -> Arc<dyn Repository<E>> {
        Arc::new(InMemoryRepository::<E>::new(
            self.db.clone(),
            self.state.clone(),
        ))
    }
}

/// Hands out a fresh [`InMemoryUnitOfWork`] per request.
#[derive(Clone)]
pub struct InMemoryUnitOfWorkFactory {
    db: InMemoryDatabase,
}

impl InMemoryUnitOfWorkFactory {
    pub fn new(db: InMemoryDatabase) -> Self {
        Self { db }
    }
}

impl UnitOfWorkFactory for InMemoryUnitOfWorkFactory {
    fn create(&self) -> Arc<dyn AppUnitOfWork> {
        Arc::new(InMemoryUnitOfWork::new(self.db.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::UserId;
    use crate::domain::user::{User, UserPasswordHash, UserRole, Username};

    fn user(name: &str) -> User {
        User::new(
            UserId::new(),
            Username::new(name).unwrap(),
            UserPasswordHash::new("h"),
            UserRole::User,
            true,
        )
    }

    async fn begun(db: &InMemoryDatabase) -> (InMemoryUnitOfWork, Arc<dyn Repository<User>>) {
        let uow = InMemoryUnitOfWork::new(db.clone());
        uow.begin().await.unwrap();
        let repo: Arc<dyn Repository<User>> = uow.repository();
        (uow, repo)
    }

    #[tokio::test]
    async fn begin_twice_fails() {
        let uow = InMemoryUnitOfWork::new(InMemoryDatabase::new());
        uow.begin().await.unwrap();

        let err = uow.begin().await.unwrap_err();

        assert_eq!(
            err,
            DataMapperError::InvalidTransactionState {
                operation: "begin",
                status: TransactionStatus::Active
            }
        );
    }

    #[tokio::test]
    async fn flush_before_begin_fails() {
        let uow = InMemoryUnitOfWork::new(InMemoryDatabase::new());
        assert!(matches!(
            uow.flush().await,
            Err(FlushError::DataMapper(
                DataMapperError::InvalidTransactionState { .. }
            ))
        ));
    }

    #[tokio::test]
    async fn pending_writes_are_invisible_until_flushed() {
        let db = InMemoryDatabase::new();
        let (uow, repo) = begun(&db).await;
        let alice = user("alice");

        repo.create(&alice).await.unwrap();
        assert!(repo.get(&alice.id()).await.unwrap().is_none());

        uow.flush().await.unwrap();
        assert!(repo.get(&alice.id()).await.unwrap().is_some());
        assert!(db.rows::<User>().unwrap().is_empty());
    }

    #[tokio::test]
    async fn commit_publishes_to_other_units_of_work() {
        let db = InMemoryDatabase::new();
        let (uow, repo) = begun(&db).await;
        let alice = user("alice");
        repo.create(&alice).await.unwrap();

        uow.commit().await.unwrap();

        let (_other, other_repo) = begun(&db).await;
        assert!(other_repo.get(&alice.id()).await.unwrap().is_some());
        assert_eq!(uow.status().await, TransactionStatus::Committed);
    }

    #[tokio::test]
    async fn second_commit_is_noop() {
        let db = InMemoryDatabase::new();
        let (uow, _repo) = begun(&db).await;
        uow.commit().await.unwrap();
        assert!(uow.commit().await.is_ok());
        assert!(uow.rollback().await.is_ok());
        assert_eq!(uow.status().await, TransactionStatus::Committed);
    }

    #[tokio::test]
    async fn rollback_discards_flushed_writes() {
        let db = InMemoryDatabase::new();
        let (uow, repo) = begun(&db).await;
        repo.create(&user("alice")).await.unwrap();
        uow.flush().await.unwrap();

        uow.rollback().await.unwrap();

        assert!(db.rows::<User>().unwrap().is_empty());
        assert_eq!(uow.status().await, TransactionStatus::RolledBack);
    }

    #[tokio::test]
    async fn rollback_before_begin_fails() {
        let uow = InMemoryUnitOfWork::new(InMemoryDatabase::new());
        assert!(uow.rollback().await.is_err());
    }

    #[tokio::test]
    async fn flush_translates_username_collision() {
        let db = InMemoryDatabase::new();
        let (first, repo) = begun(&db).await;
        repo.create(&user("alice")).await.unwrap();
        first.commit().await.unwrap();

        let (second, repo) = begun(&db).await;
        repo.create(&user("alice")).await.unwrap();
        let err = second.flush().await.unwrap_err();

        assert_eq!(err, FlushError::UsernameAlreadyExists("alice".to_string()));
        // The rejected write is dropped, the transaction stays usable.
        assert_eq!(second.status().await, TransactionStatus::Active);
        assert!(second.flush().await.is_ok());
    }

    #[tokio::test]
    async fn concurrent_flush_of_same_username_is_rejected() {
        let db = InMemoryDatabase::new();
        let (first, first_repo) = begun(&db).await;
        let (second, second_repo) = begun(&db).await;

        first_repo.create(&user("alice")).await.unwrap();
        second_repo.create(&user("alice")).await.unwrap();
        first.flush().await.unwrap();
        let err = second.flush().await.unwrap_err();

        assert_eq!(err, FlushError::UsernameAlreadyExists("alice".to_string()));
        assert_eq!(second.status().await, TransactionStatus::Active);

        first.commit().await.unwrap();
        assert!(second.commit().await.is_ok());
        assert_eq!(db.rows::<User>().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn rollback_frees_flushed_username() {
        let db = InMemoryDatabase::new();
        let (first, first_repo) = begun(&db).await;
        let (second, second_repo) = begun(&db).await;
        first_repo.create(&user("alice")).await.unwrap();
        first.flush().await.unwrap();

        first.rollback().await.unwrap();

        second_repo.create(&user("alice")).await.unwrap();
        assert!(second.flush().await.is_ok());
    }

    #[tokio::test]
    async fn dropping_an_open_unit_frees_flushed_username() {
        let db = InMemoryDatabase::new();
        {
            let (abandoned, repo) = begun(&db).await;
            repo.create(&user("alice")).await.unwrap();
            abandoned.flush().await.unwrap();
        }

        let (uow, repo) = begun(&db).await;
        repo.create(&user("alice")).await.unwrap();
        uow.commit().await.unwrap();
        assert_eq!(db.rows::<User>().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn factory_creates_independent_units() {
        let factory = InMemoryUnitOfWorkFactory::new(InMemoryDatabase::new());
        let a = factory.create();
        let b = factory.create();
        a.begin().await.unwrap();
        assert_eq!(b.status().await, TransactionStatus::NotStarted);
    }
}
