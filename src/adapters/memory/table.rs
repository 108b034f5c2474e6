//! Type-erased tables and the staged mutations applied to them.

use std::any::{Any, TypeId};
use std::collections::HashMap;

use super::entity::MemoryEntity;
use crate::adapters::constraint::{translate_violation, UniqueKey};
use crate::domain::foundation::Entity;
use crate::ports::{DataMapperError, FlushError};

/// Rows of one entity type, in insertion order.
#[derive(Debug, Clone)]
pub(super) struct Table<E> {
    rows: Vec<E>,
}

impl<E: MemoryEntity> Table<E> {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    #[cfg(test)]
    pub fn rows(&self) -> &[E] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<E> {
        self.rows
    }

    fn position(&self, id: &E::Id) -> Option<usize> {
        self.rows.iter().position(|row| row.id() == id)
    }

    /// Fails when another row already holds one of `entity`'s unique values.
    fn check_unique(&self, entity: &E, skip: Option<usize>) -> Result<(), FlushError> {
        for key in entity.unique_keys() {
            let clash = self
                .rows
                .iter()
                .enumerate()
                .filter(|(index, _)| Some(*index) != skip)
                .flat_map(|(_, row)| row.unique_keys())
                .any(|other| other == key);
            if clash {
                return Err(translate_violation(key.constraint, Some(&key.value)));
            }
        }
        Ok(())
    }

    fn insert(&mut self, entity: E) -> Result<(), FlushError> {
        if self.position(entity.id()).is_some() {
            return Err(translate_violation(
                E::PRIMARY_KEY,
                Some(&entity.id().to_string()),
            ));
        }
        self.check_unique(&entity, None)?;
        self.rows.push(entity);
        Ok(())
    }

    /// Replaces the row with the same id. Missing rows are left alone,
    /// like an `UPDATE` matching nothing.
    fn update(&mut self, entity: E) -> Result<(), FlushError> {
        if let Some(index) = self.position(entity.id()) {
            self.check_unique(&entity, Some(index))?;
            self.rows[index] = entity;
        }
        Ok(())
    }

    fn delete(&mut self, id: &E::Id) {
        self.rows.retain(|row| row.id() != id);
    }
}

pub(super) trait ErasedTable: Send + Sync {
    fn clone_box(&self) -> Box<dyn ErasedTable>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<E: MemoryEntity> ErasedTable for Table<E> {
    fn clone_box(&self) -> Box<dyn ErasedTable> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Every table in a store, keyed by entity type.
#[derive(Default)]
pub(super) struct Tables {
    inner: HashMap<TypeId, Box<dyn ErasedTable>>,
}

impl Clone for Tables {
    fn clone(&self) -> Self {
        Self {
            inner: self
                .inner
                .iter()
                .map(|(id, table)| (*id, table.clone_box()))
                .collect(),
        }
    }
}

impl Tables {
    pub fn get<E: MemoryEntity>(&self) -> Option<&Table<E>> {
        self.inner
            .get(&TypeId::of::<E>())
            .and_then(|table| table.as_any().downcast_ref())
    }

    /// Returns the table for `E`, creating it when absent.
    pub fn get_mut<E: MemoryEntity>(&mut self) -> Result<&mut Table<E>, DataMapperError> {
        self.inner
            .entry(TypeId::of::<E>())
            .or_insert_with(|| Box::new(Table::<E>::new()))
            .as_any_mut()
            .downcast_mut()
            .ok_or_else(|| {
                DataMapperError::QueryFailed(format!("table for {} has the wrong type", E::NAME))
            })
    }

    /// A copy of the rows of `E`, empty when the table does not exist.
    pub fn snapshot<E: MemoryEntity>(&self) -> Table<E> {
        self.get::<E>().cloned().unwrap_or_else(Table::new)
    }
}

/// A write waiting to be applied to a set of tables.
pub(super) trait StagedOp: Send + Sync {
    fn table(&self) -> TypeId;

    fn apply(&self, tables: &mut Tables) -> Result<(), FlushError>;

    /// Unique values the write would hold once applied.
    fn claims(&self) -> Vec<UniqueKey>;
}

pub(super) enum Mutation<E: Entity> {
    Insert(E),
    Update(E),
    Delete(E::Id),
}

impl<E: MemoryEntity> StagedOp for Mutation<E> {
    fn table(&self) -> TypeId {
        TypeId::of::<E>()
    }

    fn apply(&self, tables: &mut Tables) -> Result<(), FlushError> {
        let table = tables.get_mut::<E>()?;
        match self {
            Mutation::Insert(entity) => table.insert(entity.clone()),
            Mutation::Update(entity) => table.update(entity.clone()),
            Mutation::Delete(id) => {
                table.delete(id);
                Ok(())
            }
        }
    }

    fn claims(&self) -> Vec<UniqueKey> {
        match self {
            Mutation::Insert(entity) | Mutation::Update(entity) => entity.unique_keys(),
            Mutation::Delete(_) => Vec::new(),
        }
    }
}
