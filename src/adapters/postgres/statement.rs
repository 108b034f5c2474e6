//! Staged write statements and their error translation.

use sqlx::{Postgres, QueryBuilder};

use super::entity::{PgEntity, PgValue};
use crate::adapters::constraint::{translate_violation, UniqueKey};
use crate::ports::{DataMapperError, FlushError};

/// One write waiting for the next flush.
///
/// Carries the unique values of the row it writes so a violation can be
/// reported with the offending value.
#[derive(Debug, Clone)]
pub(super) struct StagedWrite {
    kind: WriteKind,
    table: &'static str,
    columns: &'static [&'static str],
    values: Vec<PgValue>,
    unique_keys: Vec<UniqueKey>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteKind {
    Insert,
    Update,
    Delete,
}

impl StagedWrite {
    pub fn insert<E: PgEntity>(entity: &E) -> Self {
        Self::row(WriteKind::Insert, entity)
    }

    pub fn update<E: PgEntity>(entity: &E) -> Self {
        Self::row(WriteKind::Update, entity)
    }

    pub fn delete<E: PgEntity>(entity: &E) -> Self {
        Self {
            kind: WriteKind::Delete,
            table: E::TABLE,
            columns: E::COLUMNS,
            values: vec![E::id_value(entity.id())],
            unique_keys: Vec::new(),
        }
    }

    fn row<E: PgEntity>(kind: WriteKind, entity: &E) -> Self {
        Self {
            kind,
            table: E::TABLE,
            columns: E::COLUMNS,
            values: entity.values(),
            unique_keys: entity.unique_keys(),
        }
    }

    /// Builds the SQL. The first column is the primary key.
    pub fn build(&self) -> QueryBuilder<'static, Postgres> {
        let mut values = self.values.iter().cloned();
        let id_column = self.columns.first().copied().unwrap_or("id");
        let mut builder = QueryBuilder::new("");

        match self.kind {
            WriteKind::Insert => {
                builder.push(format!(
                    "INSERT INTO {} ({}) VALUES (",
                    self.table,
                    self.columns.join(", ")
                ));
                for (index, value) in values.enumerate() {
                    if index > 0 {
                        builder.push(", ");
                    }
                    value.bind_to(&mut builder);
                }
                builder.push(")");
            }
            WriteKind::Update => {
                let id = values.next();
                builder.push(format!("UPDATE {} SET ", self.table));
                for (index, (column, value)) in
                    self.columns.iter().skip(1).zip(values).enumerate()
                {
                    if index > 0 {
                        builder.push(", ");
                    }
                    builder.push(column).push(" = ");
                    value.bind_to(&mut builder);
                }
                builder.push(format!(" WHERE {} = ", id_column));
                if let Some(id) = id {
                    id.bind_to(&mut builder);
                }
            }
            WriteKind::Delete => {
                builder.push(format!("DELETE FROM {} WHERE {} = ", self.table, id_column));
                if let Some(id) = values.next() {
                    id.bind_to(&mut builder);
                }
            }
        }
        builder
    }

    /// Maps a failure of this statement onto a flush error.
    pub fn translate(&self, err: sqlx::Error) -> FlushError {
        if let sqlx::Error::Database(db_err) = &err {
            if let Some(constraint) = db_err.constraint() {
                let value = self
                    .unique_keys
                    .iter()
                    .find(|key| key.constraint == constraint)
                    .map(|key| key.value.as_str());
                return translate_violation(constraint, value);
            }
        }
        FlushError::DataMapper(DataMapperError::QueryFailed(format!(
            "Failed to write {}: {}",
            self.table, err
        )))
    }
}
