//! Fixed identity provider.
//!
//! Resolves every request to the same caller. Used by tests and by
//! embedders that establish identity before building the request context.

use async_trait::async_trait;

use crate::domain::foundation::UserId;
use crate::ports::{AuthenticationError, IdentityProvider};

/// Identity provider that always answers the same way.
///
/// # Example
///
/// ```ignore
/// let provider = StaticIdentityProvider::authenticated(user.id());
/// assert_eq!(provider.current_user_id().await?, user.id());
/// ```
#[derive(Debug, Clone)]
pub struct StaticIdentityProvider {
    outcome: Result<UserId, AuthenticationError>,
}

impl StaticIdentityProvider {
    /// Every request comes from `user_id`.
    pub fn authenticated(user_id: UserId) -> Self {
        Self {
            outcome: Ok(user_id),
        }
    }

    /// No request carries an identity.
    pub fn anonymous() -> Self {
        Self::failing(AuthenticationError::NotAuthenticated)
    }

    /// Every lookup fails with `error`.
    pub fn failing(error: AuthenticationError) -> Self {
        Self {
            outcome: Err(error),
        }
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn current_user_id(&self) -> Result<UserId, AuthenticationError> {
        self.outcome.clone()
    }
}
