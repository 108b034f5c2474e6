//! Application error aggregate.
//!
//! Every handler returns `AppError`. Each variant maps onto a stable
//! [`ErrorCode`] so a boundary layer can translate without matching on
//! individual error types.

use thiserror::Error;

use super::authorization::AuthorizationError;
use super::mediator::RequestKind;
use crate::domain::foundation::{DomainFieldError, ErrorCode};
use crate::domain::user::{PasswordHashError, UserError};
use crate::ports::{
    AuthenticationError, DataMapperError, FlushError, PaginationError, SortingError,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error(transparent)]
    Authentication(#[from] AuthenticationError),

    #[error(transparent)]
    Authorization(#[from] AuthorizationError),

    #[error(transparent)]
    DomainField(#[from] DomainFieldError),

    #[error(transparent)]
    User(UserError),

    #[error(transparent)]
    Sorting(#[from] SortingError),

    #[error(transparent)]
    Pagination(#[from] PaginationError),

    #[error(transparent)]
    DataMapper(#[from] DataMapperError),

    #[error(transparent)]
    PasswordHashing(#[from] PasswordHashError),

    /// No handler is registered for the request kind. A wiring bug.
    #[error("No handler registered for request '{0}'")]
    HandlerNotRegistered(RequestKind),

    /// A handler received, or produced, a value of the wrong kind. A wiring bug.
    #[error("Expected {expected}, got {actual}")]
    RequestMismatch {
        expected: &'static str,
        actual: &'static str,
    },
}

impl AppError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Authentication(e) => e.code(),
            AppError::Authorization(_) => ErrorCode::Forbidden,
            AppError::DomainField(_) => ErrorCode::InvalidField,
            AppError::User(e) => e.code(),
            AppError::Sorting(_) => ErrorCode::InvalidSorting,
            AppError::Pagination(_) => ErrorCode::InvalidPagination,
            AppError::DataMapper(e) => e.code(),
            AppError::PasswordHashing(_)
            | AppError::HandlerNotRegistered(_)
            | AppError::RequestMismatch { .. } => ErrorCode::InternalError,
        }
    }

    /// True for failures caused by the caller rather than the system.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self.code(),
            ErrorCode::DatabaseError | ErrorCode::InternalError
        )
    }
}

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::PasswordHashing(e) => AppError::PasswordHashing(e),
            other => AppError::User(other),
        }
    }
}

impl From<FlushError> for AppError {
    fn from(err: FlushError) -> Self {
        match err {
            FlushError::UsernameAlreadyExists(username) => {
                AppError::User(UserError::UsernameAlreadyExists(username))
            }
            FlushError::DataMapper(e) => AppError::DataMapper(e),
        }
    }
}
