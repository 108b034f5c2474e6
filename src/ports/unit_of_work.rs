//! Unit of work port.
//!
//! A unit of work owns one transaction and hands out repositories bound to
//! it. Every repository it issues shares the same pending state, so a write
//! staged through one instance is visible to the others once flushed.
//!
//! # Lifecycle
//!
//! ```text
//! NotStarted --begin--> Active --commit--> Committed
//!                          \---rollback--> RolledBack
//! ```
//!
//! Committing twice and rolling back after commit are no-ops. Everything
//! else attempted in the wrong state fails with
//! `DataMapperError::InvalidTransactionState`.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use super::repository::{DataMapperError, Persistable, Repository};
use crate::domain::user::User;

/// Transaction lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionStatus {
    NotStarted,
    Active,
    Committed,
    RolledBack,
}

impl TransactionStatus {
    /// Committed or rolled back.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TransactionStatus::Committed | TransactionStatus::RolledBack
        )
    }

    /// Builds the error for `operation` attempted in this state.
    pub fn reject(self, operation: &'static str) -> DataMapperError {
        DataMapperError::InvalidTransactionState {
            operation,
            status: self,
        }
    }

    /// Fails unless the transaction is active.
    pub fn ensure_active(self, operation: &'static str) -> Result<(), DataMapperError> {
        match self {
            TransactionStatus::Active => Ok(()),
            other => Err(other.reject(operation)),
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransactionStatus::NotStarted => "not started",
            TransactionStatus::Active => "active",
            TransactionStatus::Committed => "committed",
            TransactionStatus::RolledBack => "rolled back",
        };
        f.write_str(s)
    }
}

/// Failure while flushing staged writes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlushError {
    /// The username uniqueness constraint rejected a staged write.
    #[error("User with username '{0}' already exists")]
    UsernameAlreadyExists(String),

    #[error(transparent)]
    DataMapper(#[from] DataMapperError),
}

/// Transaction boundary.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Opens the transaction.
    ///
    /// # Errors
    ///
    /// - `Connection` when the storage cannot be reached
    /// - `InvalidTransactionState` unless the status is `NotStarted`
    async fn begin(&self) -> Result<(), DataMapperError>;

    /// Sends staged writes inside the open transaction.
    ///
    /// # Errors
    ///
    /// - `FlushError::UsernameAlreadyExists` on a username collision
    /// - `ConstraintViolation` for any other integrity violation
    /// - `QueryFailed` for other storage failures
    async fn flush(&self) -> Result<(), FlushError>;

    /// Flushes, then commits. A second commit is a no-op.
    ///
    /// # Errors
    ///
    /// - `CommitFailed` when the flush or the commit itself fails
    async fn commit(&self) -> Result<(), DataMapperError>;

    /// Discards staged writes. A no-op once committed or rolled back.
    ///
    /// # Errors
    ///
    /// - `RollbackFailed` when the storage rejects the rollback
    async fn rollback(&self) -> Result<(), DataMapperError>;

    /// Current lifecycle state.
    async fn status(&self) -> TransactionStatus;
}

/// Issues repositories bound to the owning unit of work.
pub trait RepositoryFactory<E: Persistable>: Send + Sync {
    fn repository(&self) -> Arc<dyn Repository<E>>;
}

/// The unit of work handlers receive: lifecycle plus every repository the
/// application needs.
pub trait AppUnitOfWork: UnitOfWork + RepositoryFactory<User> {}

impl<T> AppUnitOfWork for T where T: UnitOfWork + RepositoryFactory<User> {}

/// Creates a fresh unit of work per request.
pub trait UnitOfWorkFactory: Send + Sync {
    fn create(&self) -> Arc<dyn AppUnitOfWork>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_of_work_is_object_safe() {
        fn _accepts_dyn(_uow: &dyn AppUnitOfWork) {}
        fn _accepts_factory(_factory: &dyn UnitOfWorkFactory) {}
    }

    #[test]
    fn only_active_passes_ensure_active() {
        assert!(TransactionStatus::Active.ensure_active("flush").is_ok());
        for status in [
            TransactionStatus::NotStarted,
            TransactionStatus::Committed,
            TransactionStatus::RolledBack,
        ] {
            assert!(status.ensure_active("flush").is_err());
        }
    }

    #[test]
    fn terminal_states() {
        assert!(TransactionStatus::Committed.is_terminal());
        assert!(TransactionStatus::RolledBack.is_terminal());
        assert!(!TransactionStatus::Active.is_terminal());
    }

    #[test]
    fn flush_error_wraps_data_mapper_error() {
        let err: FlushError = DataMapperError::QueryFailed("boom".to_string()).into();
        assert!(matches!(err, FlushError::DataMapper(_)));
    }
}
