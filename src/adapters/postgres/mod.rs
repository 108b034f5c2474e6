//! PostgreSQL adapters - Database implementations of the persistence ports.
//!
//! - `PostgresUnitOfWork` - One transaction, staged writes, savepoint flush
//! - `PostgresRepository<E>` - Generic repository for any `PgEntity`
//! - `PostgresUserReader` - Pool-backed user listing

mod entity;
mod repository;
mod statement;
mod unit_of_work;
mod user_mapping;
mod user_reader;

pub use entity::{PgEntity, PgValue};
pub use repository::PostgresRepository;
pub use unit_of_work::{PostgresUnitOfWork, PostgresUnitOfWorkFactory};
pub use user_reader::PostgresUserReader;
