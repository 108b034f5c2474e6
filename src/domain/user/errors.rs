//! User domain errors.

use std::fmt;
use thiserror::Error;

use crate::domain::foundation::ErrorCode;

use super::{PasswordHashError, UserRole};

/// Why a state transition on a user was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionRejection {
    /// The target holds a role nobody may modify.
    ProtectedRole,
    /// The target is already in the requested state.
    Unchanged,
}

impl fmt::Display for TransitionRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionRejection::ProtectedRole => f.write_str("the user's role is protected"),
            TransitionRejection::Unchanged => f.write_str("the user is already in that state"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserError {
    #[error("User with username '{0}' already exists")]
    UsernameAlreadyExists(String),

    #[error("User with username '{0}' is not found")]
    UserNotFoundByUsername(String),

    #[error("Changing role of user '{username}' is not permitted: {reason}")]
    RoleChangeNotPermitted {
        username: String,
        reason: TransitionRejection,
    },

    #[error("Changing activation of user '{username}' is not permitted: {reason}")]
    ActivationChangeNotPermitted {
        username: String,
        reason: TransitionRejection,
    },

    #[error("Assignment of role '{0}' is not permitted")]
    RoleAssignmentNotPermitted(UserRole),

    #[error(transparent)]
    PasswordHashing(#[from] PasswordHashError),
}

impl UserError {
    pub fn code(&self) -> ErrorCode {
        match self {
            UserError::UsernameAlreadyExists(_) => ErrorCode::UsernameAlreadyExists,
            UserError::UserNotFoundByUsername(_) => ErrorCode::UserNotFound,
            UserError::RoleChangeNotPermitted { .. } => ErrorCode::RoleChangeNotPermitted,
            UserError::ActivationChangeNotPermitted { .. } => {
                ErrorCode::ActivationChangeNotPermitted
            }
            UserError::RoleAssignmentNotPermitted(_) => ErrorCode::RoleAssignmentNotPermitted,
            UserError::PasswordHashing(_) => ErrorCode::InternalError,
        }
    }
}
