//! Adapters - Implementations of port interfaces.
//!
//! - `postgres` - Transactional persistence on PostgreSQL
//! - `memory` - Transactional in-memory persistence with the same rules
//! - `auth` - Identity provider and access revocation
//! - `security` - Argon2 password hashing
//! - `events` - Event bus implementations
//!
//! `constraint` holds the unique-constraint metadata both storage adapters
//! translate violations with.

pub mod auth;
pub mod constraint;
pub mod events;
pub mod memory;
pub mod postgres;
pub mod security;

pub use events::InMemoryEventBus;
