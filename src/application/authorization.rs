//! Authorization gate.
//!
//! A [`Permission`] is a named rule evaluated against a context describing
//! who is acting and on what. Handlers call [`authorize`] before staging
//! any write.

use thiserror::Error;
use tracing::warn;

use crate::domain::user::{User, UserRole};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthorizationError {
    #[error("Permission '{0}' denied")]
    PermissionDenied(&'static str),

    #[error("Current user is missing or inactive")]
    InactiveUser,
}

/// A named rule over a context `C`.
pub trait Permission<C>: Send + Sync {
    fn name(&self) -> &'static str;

    fn is_satisfied_by(&self, context: &C) -> bool;
}

/// Who acts, and which role the action targets.
#[derive(Debug, Clone, Copy)]
pub struct RoleManagementContext<'a> {
    pub subject: &'a User,
    pub target_role: UserRole,
}

/// Who acts, and on which user.
#[derive(Debug, Clone, Copy)]
pub struct UserManagementContext<'a> {
    pub subject: &'a User,
    pub target: &'a User,
}

/// The subject's role sits above the target role.
#[derive(Debug, Clone, Copy, Default)]
pub struct CanManageRole;

impl Permission<RoleManagementContext<'_>> for CanManageRole {
    fn name(&self) -> &'static str {
        "can_manage_role"
    }

    fn is_satisfied_by(&self, context: &RoleManagementContext<'_>) -> bool {
        context.subject.role().can_manage(context.target_role)
    }
}

/// The subject is the target.
#[derive(Debug, Clone, Copy, Default)]
pub struct CanManageSelf;

impl Permission<UserManagementContext<'_>> for CanManageSelf {
    fn name(&self) -> &'static str {
        "can_manage_self"
    }

    fn is_satisfied_by(&self, context: &UserManagementContext<'_>) -> bool {
        context.subject == context.target
    }
}

/// The subject's role sits above the target user's role.
#[derive(Debug, Clone, Copy, Default)]
pub struct CanManageSubordinate;

impl Permission<UserManagementContext<'_>> for CanManageSubordinate {
    fn name(&self) -> &'static str {
        "can_manage_subordinate"
    }

    fn is_satisfied_by(&self, context: &UserManagementContext<'_>) -> bool {
        context.subject.role().can_manage(context.target.role())
    }
}

/// Satisfied when either permission is.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyOf<A, B>(pub A, pub B);

impl<C, A, B> Permission<C> for AnyOf<A, B>
where
    A: Permission<C>,
    B: Permission<C>,
{
    fn name(&self) -> &'static str {
        "any_of"
    }

    fn is_satisfied_by(&self, context: &C) -> bool {
        self.0.is_satisfied_by(context) || self.1.is_satisfied_by(context)
    }
}

/// Evaluates `permission` against `context`.
///
/// # Errors
///
/// `PermissionDenied` naming the permission when it is not satisfied.
pub fn authorize<C, P>(permission: &P, context: &C) -> Result<(), AuthorizationError>
where
    P: Permission<C>,
{
    if permission.is_satisfied_by(context) {
        Ok(())
    } else {
        warn!(permission = permission.name(), "Authorization denied");
        Err(AuthorizationError::PermissionDenied(permission.name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::UserId;
    use crate::domain::user::{UserPasswordHash, Username};

    fn user(name: &str, role: UserRole) -> User {
        User::new(
            UserId::new(),
            Username::new(name).unwrap(),
            UserPasswordHash::new("hash"),
            role,
            true,
        )
    }

    #[test]
    fn admin_may_manage_user_role_only() {
        let admin = user("admin1", UserRole::Admin);
        let ok = RoleManagementContext {
            subject: &admin,
            target_role: UserRole::User,
        };
        let denied = RoleManagementContext {
            subject: &admin,
            target_role: UserRole::Admin,
        };

        assert!(authorize(&CanManageRole, &ok).is_ok());
        assert_eq!(
            authorize(&CanManageRole, &denied),
            Err(AuthorizationError::PermissionDenied("can_manage_role"))
        );
    }

    #[test]
    fn plain_user_manages_only_self() {
        let alice = user("alice", UserRole::User);
        let bob = user("bobby", UserRole::User);
        let permission = AnyOf(CanManageSelf, CanManageSubordinate);

        let own = UserManagementContext {
            subject: &alice,
            target: &alice,
        };
        let other = UserManagementContext {
            subject: &alice,
            target: &bob,
        };

        assert!(authorize(&permission, &own).is_ok());
        assert!(authorize(&permission, &other).is_err());
    }

    #[test]
    fn super_admin_manages_admin_subordinate() {
        let root = user("root1", UserRole::SuperAdmin);
        let admin = user("admin1", UserRole::Admin);
        let context = UserManagementContext {
            subject: &root,
            target: &admin,
        };
        assert!(authorize(&CanManageSubordinate, &context).is_ok());
    }

    #[test]
    fn admin_cannot_manage_peer_admin() {
        let a = user("admin1", UserRole::Admin);
        let b = user("admin2", UserRole::Admin);
        let context = UserManagementContext {
            subject: &a,
            target: &b,
        };
        assert!(authorize(&CanManageSubordinate, &context).is_err());
    }
}
