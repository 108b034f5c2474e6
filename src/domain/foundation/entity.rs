//! Entity identity model.
//!
//! Every persisted type implements [`Entity`] and exposes exactly one
//! identifier. The identifier type is left abstract so that entities keyed
//! by UUIDs, integers or strings share the same repository contract.

use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Bounds required of an entity's primary key.
pub trait EntityId: Clone + Eq + Hash + Debug + Display + Send + Sync + 'static {}

impl<T> EntityId for T where T: Clone + Eq + Hash + Debug + Display + Send + Sync + 'static {}

/// A persisted domain object owning exactly one identifier.
///
/// Two entities are the same entity when their identifiers are equal,
/// regardless of the rest of their state.
pub trait Entity: Clone + Debug + Send + Sync + 'static {
    /// The identifier type.
    type Id: EntityId;

    /// Returns this entity's identifier.
    fn id(&self) -> &Self::Id;

    /// Returns true when both values denote the same entity.
    fn same_identity_as(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}
