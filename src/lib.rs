//! User Accounts - account management core.
//!
//! Commands and queries for creating users, changing passwords, toggling
//! activation, and granting or revoking admin rights, each routed through a
//! mediator to a handler that runs inside its own unit of work.
//!
//! # Layers
//!
//! - `domain` - Users, roles, value objects, and domain events
//! - `ports` - Repository, unit of work, identity, and event contracts
//! - `application` - Mediator, authorization, and handlers
//! - `adapters` - PostgreSQL and in-memory persistence, auth, hashing, events
//! - `config` / `setup` - Environment configuration and wiring

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod setup;
