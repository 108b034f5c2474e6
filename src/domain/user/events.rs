//! User domain events.
//!
//! - `UserCreated` - Account created
//! - `UserPasswordChanged` - Password replaced
//! - `UserActivated` / `UserDeactivated` - Login ability toggled
//! - `AdminGranted` / `AdminRevoked` - Admin role toggled

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{domain_event, EventId, Timestamp, UserId};

use super::{User, UserRole};

// ════════════════════════════════════════════════════════════════════════════
// UserCreated
// ════════════════════════════════════════════════════════════════════════════

/// Published when a new account is created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreated {
    pub event_id: EventId,
    pub user_id: UserId,
    pub username: String,
    pub role: UserRole,
    /// Who created the account.
    pub created_by: UserId,
    pub created_at: Timestamp,
}

impl UserCreated {
    pub fn new(user: &User, created_by: UserId) -> Self {
        Self {
            event_id: EventId::new(),
            user_id: user.id(),
            username: user.username().to_string(),
            role: user.role(),
            created_by,
            created_at: Timestamp::now(),
        }
    }
}

domain_event!(
    UserCreated,
    event_type = "user.created.v1",
    aggregate_id = user_id,
    aggregate_type = "User",
    occurred_at = created_at,
    event_id = event_id
);

// ════════════════════════════════════════════════════════════════════════════
// Single-subject events
// ════════════════════════════════════════════════════════════════════════════

/// Declares an event that only records the affected user and the actor.
macro_rules! user_change_event {
    ($(#[$doc:meta])* $name:ident, $event_type:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Serialize, Deserialize)]
        pub struct $name {
            pub event_id: EventId,
            pub user_id: UserId,
            /// Who performed the change.
            pub changed_by: UserId,
            pub occurred_at: Timestamp,
        }

        impl $name {
            pub fn new(user_id: UserId, changed_by: UserId) -> Self {
                Self {
                    event_id: EventId::new(),
                    user_id,
                    changed_by,
                    occurred_at: Timestamp::now(),
                }
            }
        }

        domain_event!(
            $name,
            event_type = $event_type,
            aggregate_id = user_id,
            aggregate_type = "User",
            occurred_at = occurred_at,
            event_id = event_id
        );
    };
}

user_change_event!(
    /// Published when a user's password is replaced.
    UserPasswordChanged,
    "user.password_changed.v1"
);

user_change_event!(
    /// Published when an inactive user is reactivated.
    UserActivated,
    "user.activated.v1"
);

user_change_event!(
    /// Published when a user is deactivated and their access revoked.
    UserDeactivated,
    "user.deactivated.v1"
);

user_change_event!(
    /// Published when a user is promoted to admin.
    AdminGranted,
    "user.admin_granted.v1"
);

user_change_event!(
    /// Published when an admin is demoted to a regular user.
    AdminRevoked,
    "user.admin_revoked.v1"
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{DomainEvent, SerializableDomainEvent};
    use crate::domain::user::{UserPasswordHash, Username};

    #[test]
    fn user_created_captures_account_details() {
        let user = User::new(
            UserId::new(),
            Username::new("alice").unwrap(),
            UserPasswordHash::new("hash"),
            UserRole::Admin,
            true,
        );
        let creator = UserId::new();
        let event = UserCreated::new(&user, creator);

        assert_eq!(event.event_type(), "user.created.v1");
        assert_eq!(event.aggregate_id(), user.id().to_string());
        assert_eq!(event.username, "alice");
        assert_eq!(event.created_by, creator);
    }

    #[test]
    fn change_events_have_distinct_types() {
        let id = UserId::new();
        let actor = UserId::new();
        let types = [
            UserPasswordChanged::new(id, actor).event_type(),
            UserActivated::new(id, actor).event_type(),
            UserDeactivated::new(id, actor).event_type(),
            AdminGranted::new(id, actor).event_type(),
            AdminRevoked::new(id, actor).event_type(),
        ];
        assert_eq!(
            types,
            [
                "user.password_changed.v1",
                "user.activated.v1",
                "user.deactivated.v1",
                "user.admin_granted.v1",
                "user.admin_revoked.v1",
            ]
        );
    }

    #[test]
    fn envelope_payload_contains_actor() {
        let actor = UserId::new();
        let envelope = UserDeactivated::new(UserId::new(), actor).to_envelope();
        let restored: UserDeactivated = envelope.payload_as().unwrap();
        assert_eq!(restored.changed_by, actor);
        assert_eq!(envelope.aggregate_type, "User");
    }
}
