//! In-memory persistence adapters.
//!
//! A transactional store with the same visibility and constraint rules as
//! the Postgres adapters. Used by tests and for running without a database.

mod database;
mod entity;
mod repository;
mod table;
mod unit_of_work;
mod user_reader;

pub use database::InMemoryDatabase;
pub use entity::MemoryEntity;
pub use repository::InMemoryRepository;
pub use unit_of_work::{InMemoryUnitOfWork, InMemoryUnitOfWorkFactory};
pub use user_reader::InMemoryUserReader;
