//! Per-entity behaviour the in-memory store needs.

use std::cmp::Ordering;

use crate::adapters::constraint::ConstrainedEntity;
use crate::domain::user::{User, UserCriteria, UserSortField};

/// An entity the in-memory adapter can filter and order.
pub trait MemoryEntity: ConstrainedEntity {
    fn matches(&self, criteria: &Self::Criteria) -> bool;

    /// Ascending order by `field`, matching what the SQL adapter produces.
    fn compare(&self, other: &Self, field: Self::SortField) -> Ordering;
}

impl MemoryEntity for User {
    fn matches(&self, criteria: &UserCriteria) -> bool {
        criteria.matches(self)
    }

    fn compare(&self, other: &Self, field: UserSortField) -> Ordering {
        match field {
            UserSortField::Id => self.id().as_uuid().cmp(other.id().as_uuid()),
            UserSortField::Username => self.username().as_str().cmp(other.username().as_str()),
            // Roles are stored as text, so they order by name.
            UserSortField::Role => self.role().as_str().cmp(other.role().as_str()),
            UserSortField::IsActive => self.is_active().cmp(&other.is_active()),
        }
    }
}
