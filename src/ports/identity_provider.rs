//! Identity provider port.
//!
//! Answers "who is making this request". How the identity was established
//! (session cookie, token, test fixture) is the adapter's business.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::{ErrorCode, UserId};

/// The caller could not be identified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthenticationError {
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Authentication session expired")]
    SessionExpired,

    #[error("Authentication backend unavailable: {0}")]
    Unavailable(String),
}

impl AuthenticationError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AuthenticationError::Unavailable(_) => ErrorCode::InternalError,
            _ => ErrorCode::Unauthenticated,
        }
    }
}

/// Resolves the identity of the current caller.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Returns the id of the authenticated user.
    ///
    /// # Errors
    ///
    /// - `NotAuthenticated` when no identity is attached to the request
    /// - `SessionExpired` when the identity is no longer valid
    async fn current_user_id(&self) -> Result<UserId, AuthenticationError>;
}
