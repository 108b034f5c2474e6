//! CreateUserHandler - Command handler for creating user accounts.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tracing::info;

use crate::application::authorization::{authorize, CanManageRole, RoleManagementContext};
use crate::application::current_user::CurrentUserService;
use crate::application::errors::AppError;
use crate::application::handlers::factory::{record, HandlerScope, ScopedHandler};
use crate::application::mediator::EventRecorder;
use crate::domain::foundation::{SerializableDomainEvent, UserId};
use crate::domain::user::{RawPassword, UserCreated, UserRole, UserService, Username};
use crate::ports::{AppUnitOfWork, UserCommandGateway};

/// Command to create a user.
///
/// Open to admins. Only super admins may create admins, and nobody may
/// create a super admin.
#[derive(Clone)]
pub struct CreateUserCommand {
    pub username: String,
    pub password: String,
    pub role: UserRole,
}

impl fmt::Debug for CreateUserCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateUserCommand")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("role", &self.role)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateUserResult {
    pub id: UserId,
}

pub struct CreateUserHandler {
    current_user: CurrentUserService,
    user_service: Arc<UserService>,
    users: Arc<dyn UserCommandGateway>,
    uow: Arc<dyn AppUnitOfWork>,
    events: Arc<EventRecorder>,
}

impl CreateUserHandler {
    pub fn new(
        current_user: CurrentUserService,
        user_service: Arc<UserService>,
        users: Arc<dyn UserCommandGateway>,
        uow: Arc<dyn AppUnitOfWork>,
        events: Arc<EventRecorder>,
    ) -> Self {
        Self {
            current_user,
            user_service,
            users,
            uow,
            events,
        }
    }

    pub async fn handle(&self, cmd: CreateUserCommand) -> Result<CreateUserResult, AppError> {
        info!(username = %cmd.username, role = %cmd.role, "Create user: started");

        // 1. Resolve the acting user
        let current_user = self.current_user.current_user().await?;

        // 2. Reject unassignable roles, then authorize
        UserService::ensure_assignable(cmd.role)?;
        authorize(
            &CanManageRole,
            &RoleManagementContext {
                subject: &current_user,
                target_role: cmd.role,
            },
        )?;

        // 3. Build value objects and the user
        let username = Username::new(cmd.username)?;
        let password = RawPassword::new(cmd.password)?;
        let user = self.user_service.create_user(username, &password, cmd.role)?;

        // 4. Stage, flush to surface username collisions, commit
        self.users.add(&user).await?;
        self.uow.flush().await?;
        self.uow.commit().await?;

        // 5. Record event
        record(
            &self.events,
            UserCreated::new(&user, current_user.id()).to_envelope(),
            &current_user.id().to_string(),
        );

        info!(user_id = %user.id(), username = %user.username(), "Create user: done");
        Ok(CreateUserResult { id: user.id() })
    }
}

#[async_trait]
impl ScopedHandler for CreateUserHandler {
    type Request = CreateUserCommand;

    fn build(scope: &HandlerScope) -> Self {
        Self::new(
            scope.current_user.clone(),
            scope.user_service.clone(),
            scope.users.clone(),
            scope.uow.clone(),
            scope.events.clone(),
        )
    }

    async fn run(&self, request: CreateUserCommand) -> Result<CreateUserResult, AppError> {
        self.handle(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::authorization::AuthorizationError;
    use crate::application::handlers::test_support::Fixture;
    use crate::domain::user::{User, UserChanges, UserError};
    use crate::ports::DataMapperError;
    use std::sync::Mutex;

    /// Forwards to the real gateway and records every staged insert.
    struct RecordingGateway {
        inner: Arc<dyn UserCommandGateway>,
        added: Mutex<Vec<String>>,
    }

    impl RecordingGateway {
        fn wrapping(inner: Arc<dyn UserCommandGateway>) -> Arc<Self> {
            Arc::new(Self {
                inner,
                added: Mutex::new(Vec::new()),
            })
        }

        fn added(&self) -> Vec<String> {
            self.added.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl UserCommandGateway for RecordingGateway {
        async fn add(&self, user: &User) -> Result<(), DataMapperError> {
            self.added.lock().unwrap().push(user.username().to_string());
            self.inner.add(user).await
        }

        async fn read_by_id(&self, id: UserId) -> Result<Option<User>, DataMapperError> {
            self.inner.read_by_id(id).await
        }

        async fn read_by_username(
            &self,
            username: &Username,
        ) -> Result<Option<User>, DataMapperError> {
            self.inner.read_by_username(username).await
        }

        async fn update(
            &self,
            user: &mut User,
            changes: UserChanges,
        ) -> Result<(), DataMapperError> {
            self.inner.update(user, changes).await
        }
    }

    fn recording_handler(fx: &Fixture) -> (CreateUserHandler, Arc<RecordingGateway>) {
        let scope = fx.scope();
        let gateway = RecordingGateway::wrapping(scope.users.clone());
        let handler = CreateUserHandler::new(
            scope.current_user.clone(),
            scope.user_service.clone(),
            gateway.clone(),
            scope.uow.clone(),
            scope.events.clone(),
        );
        (handler, gateway)
    }

    fn command(username: &str, role: UserRole) -> CreateUserCommand {
        CreateUserCommand {
            username: username.to_string(),
            password: "secret123".to_string(),
            role,
        }
    }

    #[tokio::test]
    async fn admin_creates_user() {
        let fx = Fixture::acting_as(UserRole::Admin).await;

        let result = fx
            .handler::<CreateUserHandler>()
            .handle(command("newbie", UserRole::User))
            .await
            .unwrap();

        let stored = fx.stored_user("newbie").await.unwrap();
        assert_eq!(stored.id(), result.id);
        assert!(stored.is_active());
        assert_eq!(fx.event_types(), vec!["user.created.v1"]);
    }

    #[tokio::test]
    async fn fails_when_admin_creates_admin() {
        let fx = Fixture::acting_as(UserRole::Admin).await;

        let err = fx
            .handler::<CreateUserHandler>()
            .handle(command("second", UserRole::Admin))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::Authorization(AuthorizationError::PermissionDenied(_))
        ));
        assert!(fx.stored_user("second").await.is_none());
        assert!(fx.event_types().is_empty());
    }

    #[tokio::test]
    async fn rejected_admin_creation_never_stages_a_row() {
        let fx = Fixture::acting_as(UserRole::Admin).await;
        let (handler, gateway) = recording_handler(&fx);

        let result = handler.handle(command("second", UserRole::Admin)).await;

        assert!(matches!(result, Err(AppError::Authorization(_))));
        assert!(gateway.added().is_empty());
    }

    #[tokio::test]
    async fn allowed_creation_stages_exactly_one_row() {
        let fx = Fixture::acting_as(UserRole::SuperAdmin).await;
        let (handler, gateway) = recording_handler(&fx);

        handler
            .handle(command("second", UserRole::Admin))
            .await
            .unwrap();

        assert_eq!(gateway.added(), vec!["second".to_string()]);
    }

    #[tokio::test]
    async fn fails_when_creating_super_admin() {
        let fx = Fixture::acting_as(UserRole::SuperAdmin).await;

        let err = fx
            .handler::<CreateUserHandler>()
            .handle(command("another", UserRole::SuperAdmin))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            AppError::User(UserError::RoleAssignmentNotPermitted(UserRole::SuperAdmin))
        );
    }

    #[tokio::test]
    async fn fails_on_duplicate_username() {
        let fx = Fixture::acting_as(UserRole::SuperAdmin).await;
        fx.seed("taken", UserRole::User, true).await;

        let err = fx
            .handler::<CreateUserHandler>()
            .handle(command("taken", UserRole::User))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            AppError::User(UserError::UsernameAlreadyExists("taken".to_string()))
        );
    }

    #[tokio::test]
    async fn fails_on_invalid_username() {
        let fx = Fixture::acting_as(UserRole::Admin).await;

        let err = fx
            .handler::<CreateUserHandler>()
            .handle(command("x", UserRole::User))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::DomainField(_)));
    }

    #[test]
    fn debug_output_hides_password() {
        let debug = format!("{:?}", command("alice", UserRole::User));
        assert!(!debug.contains("secret123"));
    }
}
