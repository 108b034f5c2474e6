//! User roles and the management hierarchy between them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::DomainFieldError;

/// Role held by a user account.
///
/// Roles form a strict hierarchy: a super admin manages admins and users,
/// an admin manages users, a user manages nobody.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    User,
    Admin,
    SuperAdmin,
}

impl UserRole {
    /// Stable lowercase name, also used as the stored column value.
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Admin => "admin",
            UserRole::SuperAdmin => "super_admin",
        }
    }

    /// Whether a new account may be created with this role.
    pub fn is_assignable(&self) -> bool {
        !matches!(self, UserRole::SuperAdmin)
    }

    /// Whether accounts holding this role may be modified by anyone.
    pub fn is_changeable(&self) -> bool {
        !matches!(self, UserRole::SuperAdmin)
    }

    /// Roles this role is allowed to manage.
    pub fn subordinates(&self) -> &'static [UserRole] {
        match self {
            UserRole::SuperAdmin => &[UserRole::Admin, UserRole::User],
            UserRole::Admin => &[UserRole::User],
            UserRole::User => &[],
        }
    }

    /// Returns true when `self` sits above `other` in the hierarchy.
    pub fn can_manage(&self, other: UserRole) -> bool {
        self.subordinates().contains(&other)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = DomainFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(UserRole::User),
            "admin" => Ok(UserRole::Admin),
            "super_admin" => Ok(UserRole::SuperAdmin),
            other => Err(DomainFieldError::invalid_format(
                "role",
                format!("unknown role '{}'", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn super_admin_manages_admins_and_users() {
        assert!(UserRole::SuperAdmin.can_manage(UserRole::Admin));
        assert!(UserRole::SuperAdmin.can_manage(UserRole::User));
        assert!(!UserRole::SuperAdmin.can_manage(UserRole::SuperAdmin));
    }

    #[test]
    fn admin_manages_only_users() {
        assert!(UserRole::Admin.can_manage(UserRole::User));
        assert!(!UserRole::Admin.can_manage(UserRole::Admin));
        assert!(!UserRole::Admin.can_manage(UserRole::SuperAdmin));
    }

    #[test]
    fn user_manages_nobody() {
        assert!(UserRole::User.subordinates().is_empty());
    }

    #[test]
    fn super_admin_is_neither_assignable_nor_changeable() {
        assert!(!UserRole::SuperAdmin.is_assignable());
        assert!(!UserRole::SuperAdmin.is_changeable());
        assert!(UserRole::Admin.is_assignable());
        assert!(UserRole::User.is_changeable());
    }

    #[test]
    fn parses_from_stored_names() {
        for role in [UserRole::User, UserRole::Admin, UserRole::SuperAdmin] {
            assert_eq!(role.as_str().parse::<UserRole>().unwrap(), role);
        }
        assert!("root".parse::<UserRole>().is_err());
    }

    #[test]
    fn serializes_as_snake_case() {
        let json = serde_json::to_string(&UserRole::SuperAdmin).unwrap();
        assert_eq!(json, "\"super_admin\"");
    }
}
