//! CurrentUserService - Resolves the acting user for a request.

use std::sync::Arc;
use tracing::warn;

use super::authorization::AuthorizationError;
use super::errors::AppError;
use crate::domain::user::User;
use crate::ports::{AccessRevoker, IdentityProvider, UserCommandGateway};

/// Loads the user behind the request identity.
///
/// A caller whose account no longer exists or has been deactivated loses
/// all remaining access before the request is refused.
#[derive(Clone)]
pub struct CurrentUserService {
    identity_provider: Arc<dyn IdentityProvider>,
    users: Arc<dyn UserCommandGateway>,
    access_revoker: Arc<dyn AccessRevoker>,
}

impl CurrentUserService {
    pub fn new(
        identity_provider: Arc<dyn IdentityProvider>,
        users: Arc<dyn UserCommandGateway>,
        access_revoker: Arc<dyn AccessRevoker>,
    ) -> Self {
        Self {
            identity_provider,
            users,
            access_revoker,
        }
    }

    /// # Errors
    ///
    /// - `Authentication` when no identity is attached
    /// - `Authorization(InactiveUser)` when the user is gone or inactive
    /// - `DataMapper` on storage failure
    pub async fn current_user(&self) -> Result<User, AppError> {
        let user_id = self.identity_provider.current_user_id().await?;

        match self.users.read_by_id(user_id).await? {
            Some(user) if user.is_active() => Ok(user),
            found => {
                warn!(
                    user_id = %user_id,
                    exists = found.is_some(),
                    "Rejecting request from missing or inactive user"
                );
                self.access_revoker.remove_all_user_access(user_id).await?;
                Err(AuthorizationError::InactiveUser.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::UserId;
    use crate::domain::user::{UserChanges, UserPasswordHash, UserRole, Username};
    use crate::ports::{AuthenticationError, DataMapperError};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FixedIdentity(Option<UserId>);

    #[async_trait]
    impl IdentityProvider for FixedIdentity {
        async fn current_user_id(&self) -> Result<UserId, AuthenticationError> {
            self.0.ok_or(AuthenticationError::NotAuthenticated)
        }
    }

    struct MockUsers {
        users: Vec<User>,
    }

    #[async_trait]
    impl UserCommandGateway for MockUsers {
        async fn add(&self, _user: &User) -> Result<(), DataMapperError> {
            Ok(())
        }

        async fn read_by_id(&self, id: UserId) -> Result<Option<User>, DataMapperError> {
            Ok(self.users.iter().find(|u| u.id() == id).cloned())
        }

        async fn read_by_username(
            &self,
            username: &Username,
        ) -> Result<Option<User>, DataMapperError> {
            Ok(self.users.iter().find(|u| u.username() == username).cloned())
        }

        async fn update(
            &self,
            _user: &mut User,
            _changes: UserChanges,
        ) -> Result<(), DataMapperError> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingRevoker {
        revoked: Mutex<Vec<UserId>>,
    }

    #[async_trait]
    impl AccessRevoker for RecordingRevoker {
        async fn remove_all_user_access(&self, user_id: UserId) -> Result<(), DataMapperError> {
            self.revoked.lock().unwrap().push(user_id);
            Ok(())
        }
    }

    fn user(is_active: bool) -> User {
        User::new(
            UserId::new(),
            Username::new("alice").unwrap(),
            UserPasswordHash::new("hash"),
            UserRole::Admin,
            is_active,
        )
    }

    fn service(
        identity: Option<UserId>,
        users: Vec<User>,
        revoker: Arc<RecordingRevoker>,
    ) -> CurrentUserService {
        CurrentUserService::new(
            Arc::new(FixedIdentity(identity)),
            Arc::new(MockUsers { users }),
            revoker,
        )
    }

    #[tokio::test]
    async fn returns_active_user() {
        let alice = user(true);
        let revoker = Arc::new(RecordingRevoker::default());
        let found = service(Some(alice.id()), vec![alice.clone()], revoker.clone())
            .current_user()
            .await
            .unwrap();

        assert_eq!(found, alice);
        assert!(revoker.revoked.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn fails_when_not_authenticated() {
        let revoker = Arc::new(RecordingRevoker::default());
        let result = service(None, vec![], revoker).current_user().await;
        assert!(matches!(result, Err(AppError::Authentication(_))));
    }

    #[tokio::test]
    async fn revokes_access_of_inactive_user() {
        let alice = user(false);
        let revoker = Arc::new(RecordingRevoker::default());
        let result = service(Some(alice.id()), vec![alice.clone()], revoker.clone())
            .current_user()
            .await;

        assert_eq!(
            result.unwrap_err(),
            AppError::Authorization(AuthorizationError::InactiveUser)
        );
        assert_eq!(*revoker.revoked.lock().unwrap(), vec![alice.id()]);
    }

    #[tokio::test]
    async fn revokes_access_of_missing_user() {
        let ghost = UserId::new();
        let revoker = Arc::new(RecordingRevoker::default());
        let result = service(Some(ghost), vec![], revoker.clone()).current_user().await;

        assert!(matches!(result, Err(AppError::Authorization(_))));
        assert_eq!(*revoker.revoked.lock().unwrap(), vec![ghost]);
    }
}
