//! Error types for the domain layer.

use std::fmt;
use thiserror::Error;

/// Errors raised when a value object rejects its input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainFieldError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' must be between {min} and {max} characters, got {actual}")]
    InvalidLength {
        field: String,
        min: usize,
        max: usize,
        actual: usize,
    },

    #[error("Field '{field}' must be at least {min} characters, got {actual}")]
    TooShort {
        field: String,
        min: usize,
        actual: usize,
    },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl DomainFieldError {
    /// Creates an empty field error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        DomainFieldError::EmptyField { field: field.into() }
    }

    /// Creates an invalid length error.
    pub fn invalid_length(field: impl Into<String>, min: usize, max: usize, actual: usize) -> Self {
        DomainFieldError::InvalidLength {
            field: field.into(),
            min,
            max,
            actual,
        }
    }

    /// Creates an error for a value with only a lower length bound.
    pub fn too_short(field: impl Into<String>, min: usize, actual: usize) -> Self {
        DomainFieldError::TooShort {
            field: field.into(),
            min,
            actual,
        }
    }

    /// Creates an invalid format error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        DomainFieldError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Returns the name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            DomainFieldError::EmptyField { field }
            | DomainFieldError::InvalidLength { field, .. }
            | DomainFieldError::TooShort { field, .. }
            | DomainFieldError::InvalidFormat { field, .. } => field,
        }
    }
}

/// Error codes organized by category.
///
/// The boundary layer maps these onto its own status vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Validation errors
    InvalidField,
    InvalidSorting,
    InvalidPagination,

    // Identity errors
    Unauthenticated,
    Forbidden,

    // User errors
    UsernameAlreadyExists,
    UserNotFound,
    RoleChangeNotPermitted,
    ActivationChangeNotPermitted,
    RoleAssignmentNotPermitted,

    // Infrastructure errors
    DatabaseError,
    InternalError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::InvalidField => "INVALID_FIELD",
            ErrorCode::InvalidSorting => "INVALID_SORTING",
            ErrorCode::InvalidPagination => "INVALID_PAGINATION",
            ErrorCode::Unauthenticated => "UNAUTHENTICATED",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::UsernameAlreadyExists => "USERNAME_ALREADY_EXISTS",
            ErrorCode::UserNotFound => "USER_NOT_FOUND",
            ErrorCode::RoleChangeNotPermitted => "ROLE_CHANGE_NOT_PERMITTED",
            ErrorCode::ActivationChangeNotPermitted => "ACTIVATION_CHANGE_NOT_PERMITTED",
            ErrorCode::RoleAssignmentNotPermitted => "ROLE_ASSIGNMENT_NOT_PERMITTED",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", s)
    }
}
