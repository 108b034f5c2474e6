//! Generic repository port.
//!
//! One contract covers every persisted entity type. Entity specific
//! behaviour (filtering, partial updates, sortable columns) is supplied by
//! the [`Persistable`] trait, so adapters stay generic over `E`.
//!
//! # Design
//!
//! - **Transaction bound**: a repository is obtained from a unit of work and
//!   all writes are staged inside that unit of work until flushed.
//! - **Typed queries**: criteria, changes and sort fields are entity specific
//!   types instead of free-form keyword maps.
//! - **Storage agnostic errors**: every failure surfaces as
//!   [`DataMapperError`]; driver error types never leak.

use async_trait::async_trait;
use std::fmt::Debug;
use thiserror::Error;

use super::query_params::{Pagination, Sorting};
use super::unit_of_work::TransactionStatus;
use crate::domain::foundation::{Entity, ErrorCode};

/// Storage layer failure, independent of the storage engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataMapperError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Database query failed: {0}")]
    QueryFailed(String),

    #[error("Constraint '{constraint}' violated")]
    ConstraintViolation { constraint: String },

    #[error("Transaction commit failed: {0}")]
    CommitFailed(String),

    #[error("Transaction rollback failed: {0}")]
    RollbackFailed(String),

    #[error("Cannot {operation} while transaction is {status}")]
    InvalidTransactionState {
        operation: &'static str,
        status: TransactionStatus,
    },

    #[error("Query for {entity} returned more than one row")]
    MultipleResults { entity: &'static str },
}

impl DataMapperError {
    pub fn code(&self) -> ErrorCode {
        match self {
            DataMapperError::InvalidTransactionState { .. } => ErrorCode::InternalError,
            _ => ErrorCode::DatabaseError,
        }
    }
}

/// An entity the generic repository can persist.
pub trait Persistable: Entity {
    /// Typed filter. `Default` matches every row.
    type Criteria: Clone + Debug + Default + Send + Sync + 'static;

    /// Typed partial update. `None` fields are left untouched.
    type Changes: Clone + Debug + Default + Send + Sync + 'static;

    /// Allow-listed sortable fields.
    type SortField: Copy + Debug + Send + Sync + 'static;

    /// Short name used in errors and logs.
    const NAME: &'static str;

    /// Applies every `Some` field of `changes` to `self`.
    fn apply_changes(&mut self, changes: &Self::Changes);
}

/// Generic repository over one entity type.
#[async_trait]
pub trait Repository<E: Persistable>: Send + Sync {
    /// Loads an entity by primary key.
    ///
    /// Returns `None` if not found.
    async fn get(&self, id: &E::Id) -> Result<Option<E>, DataMapperError>;

    /// Loads the single entity matching `criteria`.
    ///
    /// # Errors
    ///
    /// - `MultipleResults` when more than one row matches
    async fn one(&self, criteria: &E::Criteria) -> Result<Option<E>, DataMapperError>;

    /// Lists entities: filter, then sort, then paginate.
    async fn all(
        &self,
        pagination: Option<Pagination>,
        sorting: Option<Sorting<E::SortField>>,
        criteria: &E::Criteria,
    ) -> Result<Vec<E>, DataMapperError>;

    /// Returns true when at least one row matches, without loading rows.
    async fn exists(&self, criteria: &E::Criteria) -> Result<bool, DataMapperError>;

    /// Stages an insert. Uniqueness is checked when the unit of work flushes.
    async fn create(&self, entity: &E) -> Result<(), DataMapperError>;

    /// Stages inserts for every entity, in order.
    async fn create_all(&self, entities: &[E]) -> Result<(), DataMapperError>;

    /// Applies `changes` to `entity` and stages the update.
    async fn update(&self, entity: &mut E, changes: E::Changes) -> Result<(), DataMapperError>;

    /// Stages removal of `entity`.
    async fn delete(&self, entity: &E) -> Result<(), DataMapperError>;
}
