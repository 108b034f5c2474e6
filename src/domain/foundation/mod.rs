//! Foundation module - Shared domain primitives.
//!
//! Contains the entity identity model, identifiers, timestamps, events and
//! error types that form the vocabulary of the domain.

mod entity;
mod errors;
mod events;
mod ids;
mod timestamp;

pub use entity::{Entity, EntityId};
pub use errors::{DomainFieldError, ErrorCode};
pub use crate::domain_event;
pub use events::{DomainEvent, EventEnvelope, EventId, EventMetadata, SerializableDomainEvent};
pub use ids::UserId;
pub use timestamp::Timestamp;
