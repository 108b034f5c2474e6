//! Shared in-memory store.
//!
//! Committed state lives behind one lock. Units of work never write to it
//! until commit, where their staged operations are applied to a copy that
//! replaces the live tables in one step.
//!
//! Unique values written by a flushed but uncommitted unit of work are
//! reserved for it, the way a database holds the index entry of an
//! uncommitted insert. A second unit of work flushing the same value is
//! rejected at flush, and the reservation ends when its owner commits,
//! rolls back or is dropped.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

use super::entity::MemoryEntity;
use super::table::{StagedOp, Tables};
use crate::adapters::constraint::{translate_violation, UniqueKey};
use crate::ports::{DataMapperError, FlushError};

/// Identifies the unit of work holding a reservation.
pub(super) type OwnerId = u64;

/// Committed tables shared by every unit of work built on this store.
#[derive(Clone, Default)]
pub struct InMemoryDatabase {
    tables: Arc<RwLock<Tables>>,
    reservations: Arc<Mutex<HashMap<(TypeId, UniqueKey), OwnerId>>>,
    next_owner: Arc<AtomicU64>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh owner id for a new unit of work.
    pub(super) fn register(&self) -> OwnerId {
        self.next_owner.fetch_add(1, Ordering::Relaxed)
    }

    /// Reserves every unique value `ops` claim for `owner`.
    ///
    /// Nothing is reserved when any value is already held by another owner.
    pub(super) fn reserve(&self, owner: OwnerId, ops: &[&dyn StagedOp]) -> Result<(), FlushError> {
        let mut held = self
            .reservations
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let claims: Vec<(TypeId, UniqueKey)> = ops
            .iter()
            .flat_map(|op| op.claims().into_iter().map(move |key| (op.table(), key)))
            .collect();
        if let Some((_, key)) = claims
            .iter()
            .find(|claim| held.get(*claim).is_some_and(|holder| *holder != owner))
        {
            return Err(translate_violation(key.constraint, Some(&key.value)));
        }

        for claim in claims {
            held.insert(claim, owner);
        }
        Ok(())
    }

    /// Drops every reservation held by `owner`.
    pub(super) fn release(&self, owner: OwnerId) {
        self.reservations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|_, holder| *holder != owner);
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, DataMapperError> {
        self.tables
            .read()
            .map_err(|_| DataMapperError::Connection("in-memory store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, DataMapperError> {
        self.tables
            .write()
            .map_err(|_| DataMapperError::Connection("in-memory store lock poisoned".to_string()))
    }

    /// Committed rows of `E`.
    pub(super) fn rows<E: MemoryEntity>(&self) -> Result<Vec<E>, DataMapperError> {
        Ok(self.read()?.snapshot::<E>().into_rows())
    }

    /// Committed rows of `E` with `flushed` layered on top.
    ///
    /// An operation that no longer applies cleanly is skipped here and
    /// reported again at commit.
    pub(super) fn view<E: MemoryEntity>(
        &self,
        flushed: &[Box<dyn StagedOp>],
    ) -> Result<Vec<E>, DataMapperError> {
        let mut tables = self.read()?.clone();
        for op in flushed {
            if op.table() == TypeId::of::<E>() {
                if let Err(err) = op.apply(&mut tables) {
                    debug!(error = %err, "Flushed operation no longer applies to committed rows");
                }
            }
        }
        Ok(tables.snapshot::<E>().into_rows())
    }

    /// Applies `ops` to a scratch copy of the committed tables, failing on
    /// the first violation. Committed state is left untouched.
    pub(super) fn validate(&self, ops: &[&dyn StagedOp]) -> Result<(), FlushError> {
        let mut scratch = self.read()?.clone();
        ops.iter().try_for_each(|op| op.apply(&mut scratch))
    }

    /// Applies `ops` atomically: either all of them land or none do.
    pub(super) fn apply_all(&self, ops: &[Box<dyn StagedOp>]) -> Result<(), FlushError> {
        let mut live = self.write()?;
        let mut next = live.clone();
        for op in ops {
            op.apply(&mut next)?;
        }
        *live = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::table::Mutation;
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

    #[test]
    fn apply_all_is_all_or_nothing() {
        let db = InMemoryDatabase::new();
        let ops: Vec<Box<dyn StagedOp>> = vec![
            Box::new(Mutation::Insert(user("alice"))),
            Box::new(Mutation::Insert(user("alice"))),
        ];

        let err = db.apply_all(&ops).unwrap_err();

        assert_eq!(err, FlushError::UsernameAlreadyExists("alice".to_string()));
        assert!(db.rows::<User>().unwrap().is_empty());
    }

    #[test]
    fn view_layers_flushed_ops_without_committing() {
        let db = InMemoryDatabase::new();
        let flushed: Vec<Box<dyn StagedOp>> = vec![Box::new(Mutation::Insert(user("alice")))];

        assert_eq!(db.view::<User>(&flushed).unwrap().len(), 1);
        assert!(db.rows::<User>().unwrap().is_empty());
    }

    #[test]
    fn validate_leaves_store_untouched() {
        let db = InMemoryDatabase::new();
        let op = Mutation::Insert(user("alice"));

        db.validate(&[&op]).unwrap();

        assert!(db.rows::<User>().unwrap().is_empty());
    }

    #[test]
    fn reservation_blocks_other_owners_until_released() {
        let db = InMemoryDatabase::new();
        let (first, second) = (db.register(), db.register());
        let alice = Mutation::Insert(user("alice"));

        db.reserve(first, &[&alice]).unwrap();
        db.reserve(first, &[&alice]).unwrap();
        let err = db.reserve(second, &[&alice]).unwrap_err();
        assert_eq!(err, FlushError::UsernameAlreadyExists("alice".to_string()));

        db.release(first);
        assert!(db.reserve(second, &[&alice]).is_ok());
    }

    #[test]
    fn rejected_reservation_holds_nothing() {
        let db = InMemoryDatabase::new();
        let (first, second, third) = (db.register(), db.register(), db.register());
        db.reserve(first, &[&Mutation::Insert(user("alice"))]).unwrap();

        let bobby = Mutation::Insert(user("bobby"));
        let alice = Mutation::Insert(user("alice"));
        assert!(db.reserve(second, &[&bobby, &alice]).is_err());

        assert!(db.reserve(third, &[&bobby]).is_ok());
    }

    #[test]
    fn clones_share_state() {
        let db = InMemoryDatabase::new();
        let other = db.clone();
        let ops: Vec<Box<dyn StagedOp>> = vec![Box::new(Mutation::Insert(user("alice")))];

        db.apply_all(&ops).unwrap();

        assert_eq!(other.rows::<User>().unwrap().len(), 1);
    }
}
