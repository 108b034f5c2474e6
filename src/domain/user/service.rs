//! User domain service.
//!
//! Owns the rules for creating accounts and for every state transition a
//! user can go through. Transitions do not mutate the user directly; they
//! return the [`UserChanges`] to stage through a repository.

use std::sync::Arc;

use crate::domain::foundation::UserId;

use super::{
    PasswordHasher, RawPassword, TransitionRejection, User, UserChanges, UserError, UserRole,
    Username,
};

pub struct UserService {
    password_hasher: Arc<dyn PasswordHasher>,
}

impl UserService {
    pub fn new(password_hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { password_hasher }
    }

    /// # Errors
    ///
    /// `RoleAssignmentNotPermitted` when `role` cannot be given to a new user.
    pub fn ensure_assignable(role: UserRole) -> Result<(), UserError> {
        if role.is_assignable() {
            Ok(())
        } else {
            Err(UserError::RoleAssignmentNotPermitted(role))
        }
    }

    /// Builds a new active user with a hashed password.
    ///
    /// # Errors
    ///
    /// - `RoleAssignmentNotPermitted` for roles that cannot be assigned
    /// - `PasswordHashing` when the hasher fails
    pub fn create_user(
        &self,
        username: Username,
        password: &RawPassword,
        role: UserRole,
    ) -> Result<User, UserError> {
        Self::ensure_assignable(role)?;
        let hash = self.password_hasher.hash(password)?;
        Ok(User::new(UserId::new(), username, hash, role, true))
    }

    pub fn change_password(
        &self,
        _user: &User,
        password: &RawPassword,
    ) -> Result<UserChanges, UserError> {
        let hash = self.password_hasher.hash(password)?;
        Ok(UserChanges {
            password_hash: Some(hash),
            ..UserChanges::default()
        })
    }

    /// # Errors
    ///
    /// `ActivationChangeNotPermitted` when the target's role is protected or
    /// the user is already in the requested state.
    pub fn toggle_activation(
        &self,
        user: &User,
        is_active: bool,
    ) -> Result<UserChanges, UserError> {
        let rejection = if !user.role().is_changeable() {
            Some(TransitionRejection::ProtectedRole)
        } else if user.is_active() == is_active {
            Some(TransitionRejection::Unchanged)
        } else {
            None
        };
        if let Some(reason) = rejection {
            return Err(UserError::ActivationChangeNotPermitted {
                username: user.username().to_string(),
                reason,
            });
        }
        Ok(UserChanges {
            is_active: Some(is_active),
            ..UserChanges::default()
        })
    }

    /// # Errors
    ///
    /// `RoleChangeNotPermitted` when the target's role is protected or it
    /// already holds the requested role.
    pub fn toggle_admin_role(
        &self,
        user: &User,
        is_admin: bool,
    ) -> Result<UserChanges, UserError> {
        let target = if is_admin {
            UserRole::Admin
        } else {
            UserRole::User
        };
        let rejection = if !user.role().is_changeable() {
            Some(TransitionRejection::ProtectedRole)
        } else if user.role() == target {
            Some(TransitionRejection::Unchanged)
        } else {
            None
        };
        if let Some(reason) = rejection {
            return Err(UserError::RoleChangeNotPermitted {
                username: user.username().to_string(),
                reason,
            });
        }
        Ok(UserChanges {
            role: Some(target),
            ..UserChanges::default()
        })
    }
}
