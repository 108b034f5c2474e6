//! Typed query and update shapes for persisting users.

use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::UserId;
use crate::ports::{Persistable, SortingError};

use super::{User, UserPasswordHash, UserRole, Username};

/// Filter over users. Every `Some` field must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserCriteria {
    pub id: Option<UserId>,
    pub username: Option<Username>,
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
}

impl UserCriteria {
    pub fn by_username(username: Username) -> Self {
        Self {
            username: Some(username),
            ..Self::default()
        }
    }

    pub fn by_role(role: UserRole) -> Self {
        Self {
            role: Some(role),
            ..Self::default()
        }
    }

    pub fn matches(&self, user: &User) -> bool {
        self.id.map_or(true, |id| user.id() == id)
            && self.username.as_ref().map_or(true, |u| user.username() == u)
            && self.role.map_or(true, |r| user.role() == r)
            && self.is_active.map_or(true, |a| user.is_active() == a)
    }
}

/// Partial update of a user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub username: Option<Username>,
    pub password_hash: Option<UserPasswordHash>,
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.password_hash.is_none()
            && self.role.is_none()
            && self.is_active.is_none()
    }
}

/// Columns users may be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserSortField {
    Id,
    Username,
    Role,
    IsActive,
}

impl UserSortField {
    pub const ALL: [UserSortField; 4] = [
        UserSortField::Id,
        UserSortField::Username,
        UserSortField::Role,
        UserSortField::IsActive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UserSortField::Id => "id",
            UserSortField::Username => "username",
            UserSortField::Role => "role",
            UserSortField::IsActive => "is_active",
        }
    }
}

impl fmt::Display for UserSortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserSortField {
    type Err = SortingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| SortingError::UnknownField(s.to_string()))
    }
}

impl Persistable for User {
    type Criteria = UserCriteria;
    type Changes = UserChanges;
    type SortField = UserSortField;

    const NAME: &'static str = "user";

    fn apply_changes(&mut self, changes: &UserChanges) {
        if let Some(username) = &changes.username {
            self.set_username(username.clone());
        }
        if let Some(hash) = &changes.password_hash {
            self.set_password_hash(hash.clone());
        }
        if let Some(role) = changes.role {
            self.set_role(role);
        }
        if let Some(is_active) = changes.is_active {
            self.set_active(is_active);
        }
    }
}
