//! Table descriptors for entities stored in PostgreSQL.

use sqlx::postgres::PgRow;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::adapters::constraint::ConstrainedEntity;
use crate::ports::DataMapperError;

/// A bindable column value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PgValue {
    Uuid(Uuid),
    Text(String),
    Bool(bool),
}

impl PgValue {
    pub(super) fn bind_to(self, builder: &mut QueryBuilder<'static, Postgres>) {
        match self {
            PgValue::Uuid(v) => builder.push_bind(v),
            PgValue::Text(v) => builder.push_bind(v),
            PgValue::Bool(v) => builder.push_bind(v),
        };
    }
}

/// Maps an entity onto one table.
///
/// `COLUMNS` lists every column with the primary key first; `values`
/// returns them in the same order.
pub trait PgEntity: ConstrainedEntity {
    const TABLE: &'static str;

    const COLUMNS: &'static [&'static str];

    fn id_value(id: &Self::Id) -> PgValue;

    fn values(&self) -> Vec<PgValue>;

    /// Equality filters for `criteria`, joined with `AND`.
    fn filters(criteria: &Self::Criteria) -> Vec<(&'static str, PgValue)>;

    fn sort_column(field: Self::SortField) -> &'static str;

    fn from_row(row: &PgRow) -> Result<Self, DataMapperError>;
}

/// Primary key column of `E`.
pub(super) fn id_column<E: PgEntity>() -> &'static str {
    E::COLUMNS.first().copied().unwrap_or("id")
}

/// `SELECT <columns> FROM <table>` followed by the `WHERE` clause for
/// `criteria`.
pub(super) fn select_where<E: PgEntity>(criteria: &E::Criteria) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!(
        "SELECT {} FROM {}",
        E::COLUMNS.join(", "),
        E::TABLE
    ));
    push_filters(&mut builder, E::filters(criteria));
    builder
}

pub(super) fn push_filters(
    builder: &mut QueryBuilder<'static, Postgres>,
    filters: Vec<(&'static str, PgValue)>,
) {
    for (index, (column, value)) in filters.into_iter().enumerate() {
        builder.push(if index == 0 { " WHERE " } else { " AND " });
        builder.push(column).push(" = ");
        value.bind_to(builder);
    }
}
