//! User entity.

use crate::domain::foundation::{Entity, UserId};

use super::{UserPasswordHash, UserRole, Username};

/// A user account.
///
/// Equality is identity: two `User` values are equal when their ids match.
#[derive(Debug, Clone)]
pub struct User {
    id: UserId,
    username: Username,
    password_hash: UserPasswordHash,
    role: UserRole,
    is_active: bool,
}

impl User {
    pub fn new(
        id: UserId,
        username: Username,
        password_hash: UserPasswordHash,
        role: UserRole,
        is_active: bool,
    ) -> Self {
        Self {
            id,
            username,
            password_hash,
            role,
            is_active,
        }
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn username(&self) -> &Username {
        &self.username
    }

    pub fn password_hash(&self) -> &UserPasswordHash {
        &self.password_hash
    }

    pub fn role(&self) -> UserRole {
        self.role
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub(crate) fn set_username(&mut self, username: Username) {
        self.username = username;
    }

    pub(crate) fn set_password_hash(&mut self, hash: UserPasswordHash) {
        self.password_hash = hash;
    }

    pub(crate) fn set_role(&mut self, role: UserRole) {
        self.role = role;
    }

    pub(crate) fn set_active(&mut self, is_active: bool) {
        self.is_active = is_active;
    }
}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for User {}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &UserId {
        &self.id
    }
}
