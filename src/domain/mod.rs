//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (identity, events, errors)
//! - `user` - User accounts, roles, credentials and their transitions

pub mod foundation;
pub mod user;
